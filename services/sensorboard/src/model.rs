//! Records fetched from the backend and the element keys derived from them

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque identifier of a group or sensor.
///
/// The backend may send ids as JSON strings or integers; both are kept in
/// their textual form so `1` and `"1"` join to the same element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct EntityIdVisitor;

impl Visitor<'_> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        Ok(EntityId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<EntityId, E> {
        Ok(EntityId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

/// A named collection of sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: EntityId,
    pub name: String,
}

impl Group {
    pub fn new(group_id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
        }
    }
}

/// Latest reading of a single sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub sensor_id: EntityId,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Sensor {
    pub fn new(sensor_id: impl Into<EntityId>, data: impl Into<serde_json::Value>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            data: data.into(),
        }
    }

    /// Text shown for this sensor's list item
    pub fn display_text(&self) -> String {
        let measure = match &self.data {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!("Sensor ID: {}, Last Measure: {}", self.sensor_id, measure)
    }
}

/// Sensor lists of several groups, as returned by the batched endpoint
pub type SensorBatch = BTreeMap<EntityId, Vec<Sensor>>;

/// Request body of the batched sensor endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorBatchRequest<'a> {
    pub group_ids: &'a [EntityId],
}

/// Key of a group's element
pub fn group_key(group_id: &EntityId) -> String {
    format!("group-{}", group_id)
}

/// Key of a group's sensor list element (its sensor mount point)
pub fn sensor_list_key(group_id: &EntityId) -> String {
    format!("sensors-{}", group_id)
}

/// Key of a sensor's list item
pub fn sensor_key(sensor_id: &EntityId) -> String {
    format!("sensor-{}", sensor_id)
}
