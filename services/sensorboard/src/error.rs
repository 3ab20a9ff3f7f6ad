//! Error types for the sensorboard service

/// Errors that can occur in the sensorboard service
#[derive(Debug, thiserror::Error)]
pub enum SensorboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Element not found: {0}")]
    MissingTarget(String),

    #[error("Element already exists: {0}")]
    DuplicateTarget(String),
}

/// Result type alias for sensorboard operations
pub type Result<T> = std::result::Result<T, SensorboardError>;
