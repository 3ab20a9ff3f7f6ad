//! Client for the group/sensor backend

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::io::{HttpClient, HttpResponse};
use crate::model::{EntityId, Group, Sensor, SensorBatch, SensorBatchRequest};
use crate::SensorboardError;

/// Fetches groups and sensor readings over HTTP
pub struct BackendClient {
    base_url: Url,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig, http: Arc<dyn HttpClient>) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SensorboardError::Config(format!("Invalid backend base_url {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SensorboardError::Config(format!(
                "Backend base_url {:?} cannot carry a path",
                config.base_url
            )));
        }

        tracing::debug!("Created BackendClient for {}", base_url);
        Ok(Self { base_url, http })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /groups`
    pub async fn fetch_groups(&self) -> crate::Result<Vec<Group>> {
        let url = self.endpoint(&["groups"]);
        let response = self.http.get(url.as_str()).await?;
        parse_list(&url, response)
    }

    /// `GET /groups/{group_id}/sensors`
    pub async fn fetch_group_sensors(&self, group_id: &EntityId) -> crate::Result<Vec<Sensor>> {
        let url = self.endpoint(&["groups", group_id.as_str(), "sensors"]);
        let response = self.http.get(url.as_str()).await?;
        parse_list(&url, response)
    }

    /// `POST /groups/sensors` with the ids of every group to fetch
    pub async fn fetch_sensor_batch(&self, group_ids: &[EntityId]) -> crate::Result<SensorBatch> {
        let url = self.endpoint(&["groups", "sensors"]);
        let body = serde_json::to_string(&SensorBatchRequest { group_ids })?;
        let response = self.http.post_json(url.as_str(), &body).await?;
        let raw: BTreeMap<EntityId, Option<Vec<Sensor>>> = parse_body(&url, response)?;
        Ok(raw
            .into_iter()
            .map(|(group_id, sensors)| (group_id, sensors.unwrap_or_default()))
            .collect())
    }
}

fn parse_body<T: DeserializeOwned>(url: &Url, response: HttpResponse) -> crate::Result<T> {
    if !response.is_success() {
        return Err(SensorboardError::Http(format!(
            "{} returned status {}",
            url, response.status
        )));
    }
    Ok(serde_json::from_str(&response.body)?)
}

/// Lists may arrive as `null` when empty
fn parse_list<T: DeserializeOwned>(url: &Url, response: HttpResponse) -> crate::Result<Vec<T>> {
    let list: Option<Vec<T>> = parse_body(url, response)?;
    Ok(list.unwrap_or_default())
}
