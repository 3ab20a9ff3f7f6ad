//! In-memory element tree mirroring what the dashboard displays
//!
//! Every element carries a [`NodeId`] assigned at creation. Updates keep the
//! id, so callers can tell an element updated in place from one recreated.

use serde::Serialize;

use crate::model::{group_key, sensor_key, sensor_list_key, EntityId};
use crate::reconcile::Patch;
use crate::{Result, SensorboardError};

/// Identity of a rendered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u64);

/// A sensor's list item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorItem {
    pub node: NodeId,
    pub key: String,
    pub sensor_id: EntityId,
    pub text: String,
}

/// A group's sensor list (the mount point for sensor items)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorList {
    pub key: String,
    pub items: Vec<SensorItem>,
}

impl SensorList {
    pub fn item(&self, sensor_id: &EntityId) -> Option<&SensorItem> {
        self.items.iter().find(|i| &i.sensor_id == sensor_id)
    }

    fn position(&self, sensor_id: &EntityId) -> Option<usize> {
        self.items.iter().position(|i| &i.sensor_id == sensor_id)
    }
}

/// A group section: heading plus sensor list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupElement {
    pub node: NodeId,
    pub key: String,
    pub group_id: EntityId,
    pub heading: String,
    pub sensors: SensorList,
}

/// The `groups` container and everything below it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewTree {
    groups: Vec<GroupElement>,
    #[serde(skip)]
    next_node: u64,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group elements in display order
    pub fn groups(&self) -> &[GroupElement] {
        &self.groups
    }

    pub fn group(&self, group_id: &EntityId) -> Option<&GroupElement> {
        self.groups.iter().find(|g| &g.group_id == group_id)
    }

    /// The sensor list of a group, if that group is rendered
    pub fn sensor_list(&self, group_id: &EntityId) -> Option<&SensorList> {
        self.group(group_id).map(|g| &g.sensors)
    }

    /// Keys of all group elements, in display order
    pub fn group_keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    /// Keys of a group's sensor items, in display order
    pub fn sensor_keys(&self, group_id: &EntityId) -> Vec<&str> {
        self.sensor_list(group_id)
            .map(|l| l.items.iter().map(|i| i.key.as_str()).collect())
            .unwrap_or_default()
    }

    fn allocate_node(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(self.next_node)
    }

    fn group_position(&self, group_id: &EntityId) -> Result<usize> {
        self.groups
            .iter()
            .position(|g| &g.group_id == group_id)
            .ok_or_else(|| SensorboardError::MissingTarget(group_key(group_id)))
    }

    fn list_mut(&mut self, group_id: &EntityId) -> Result<&mut SensorList> {
        self.groups
            .iter_mut()
            .find(|g| &g.group_id == group_id)
            .map(|g| &mut g.sensors)
            .ok_or_else(|| SensorboardError::MissingTarget(sensor_list_key(group_id)))
    }

    fn new_item(&mut self, sensor_id: &EntityId, text: &str) -> SensorItem {
        SensorItem {
            node: self.allocate_node(),
            key: sensor_key(sensor_id),
            sensor_id: sensor_id.clone(),
            text: text.to_string(),
        }
    }

    /// Apply one patch. A patch whose target is missing (or, for creations,
    /// already present) fails without touching the tree.
    pub fn apply(&mut self, patch: &Patch) -> Result<()> {
        match patch {
            Patch::CreateGroup { group_id, name } => {
                if self.group(group_id).is_some() {
                    return Err(SensorboardError::DuplicateTarget(group_key(group_id)));
                }
                let node = self.allocate_node();
                self.groups.push(GroupElement {
                    node,
                    key: group_key(group_id),
                    group_id: group_id.clone(),
                    heading: name.clone(),
                    sensors: SensorList {
                        key: sensor_list_key(group_id),
                        items: Vec::new(),
                    },
                });
            }
            Patch::RenameGroup { group_id, name } => {
                let index = self.group_position(group_id)?;
                self.groups[index].heading = name.clone();
            }
            Patch::RemoveGroup { group_id } => {
                let index = self.group_position(group_id)?;
                self.groups.remove(index);
            }
            Patch::CreateSensor {
                group_id,
                sensor_id,
                text,
            } => {
                if self.list_mut(group_id)?.item(sensor_id).is_some() {
                    return Err(SensorboardError::DuplicateTarget(sensor_key(sensor_id)));
                }
                let item = self.new_item(sensor_id, text);
                self.list_mut(group_id)?.items.push(item);
            }
            Patch::UpdateSensor {
                group_id,
                sensor_id,
                text,
            } => {
                let list = self.list_mut(group_id)?;
                let index = list
                    .position(sensor_id)
                    .ok_or_else(|| SensorboardError::MissingTarget(sensor_key(sensor_id)))?;
                list.items[index].text = text.clone();
            }
            Patch::RemoveSensor {
                group_id,
                sensor_id,
            } => {
                let list = self.list_mut(group_id)?;
                let index = list
                    .position(sensor_id)
                    .ok_or_else(|| SensorboardError::MissingTarget(sensor_key(sensor_id)))?;
                list.items.remove(index);
            }
            Patch::ReplaceSensors { group_id, items } => {
                // Resolve the target first so a missing list leaves nothing half done
                self.list_mut(group_id)?;
                let fresh: Vec<SensorItem> = items
                    .iter()
                    .map(|(sensor_id, text)| self.new_item(sensor_id, text))
                    .collect();
                self.list_mut(group_id)?.items = fresh;
            }
        }
        Ok(())
    }

    /// Apply patches in order, stopping at the first failure
    pub fn apply_all(&mut self, patches: &[Patch]) -> Result<()> {
        for patch in patches {
            self.apply(patch)?;
        }
        Ok(())
    }
}
