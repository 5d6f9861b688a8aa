//! Error types for the cf-app service layer.

use std::path::PathBuf;

use cf_cell::CellError;
use cf_sim::SimError;

/// Application error type that wraps errors from the backend crates and
/// provides a unified error interface for the CLI and library callers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub(crate) fn parameter(key: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// The offending key, for parameter failures.
    pub fn parameter_key(&self) -> Option<&str> {
        match self {
            AppError::InvalidParameter { key, .. } => Some(key),
            _ => None,
        }
    }
}

// Conversions from backend error types
impl From<SimError> for AppError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidParameter { key, reason } => AppError::InvalidParameter { key, reason },
            other => AppError::Simulation(other.to_string()),
        }
    }
}

impl From<CellError> for AppError {
    fn from(err: CellError) -> Self {
        SimError::from(err).into()
    }
}
