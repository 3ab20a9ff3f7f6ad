//! Configuration types for the sensorboard service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Reject settings the poller cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.polling.groups_interval_ms == 0 {
            return Err(crate::SensorboardError::Config(
                "groups_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.polling.sensors_interval_ms == 0 {
            return Err(crate::SensorboardError::Config(
                "sensors_interval_ms must be greater than zero".to_string(),
            ));
        }
        if let Err(e) = reqwest::Url::parse(&self.backend.base_url) {
            return Err(crate::SensorboardError::Config(format!(
                "Invalid backend base_url {:?}: {}",
                self.backend.base_url, e
            )));
        }
        Ok(())
    }
}

/// Where the group and sensor data comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for a single request; unbounded when absent
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: None,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

/// How sensor data is fetched and reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One sensor request per group, in-place keyed updates
    Keyed,
    /// One sensor request for all known groups, full list replacement
    Batched,
}

/// Polling timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_interval_ms")]
    pub groups_interval_ms: u64,
    /// Only used by the batched strategy
    #[serde(default = "default_interval_ms")]
    pub sensors_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            groups_interval_ms: default_interval_ms(),
            sensors_interval_ms: default_interval_ms(),
        }
    }
}

impl PollingConfig {
    pub fn groups_interval(&self) -> Duration {
        Duration::from_millis(self.groups_interval_ms)
    }

    pub fn sensors_interval(&self) -> Duration {
        Duration::from_millis(self.sensors_interval_ms)
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:1323".to_string()
}

fn default_strategy() -> Strategy {
    Strategy::Batched
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    11116
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::SensorboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
