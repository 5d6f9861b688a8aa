//! Error types for simulation operations.

use cf_cell::CellError;
use cf_core::CoreError;
use thiserror::Error;

/// Errors encountered while setting up or stepping a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn parameter(key: &str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<CellError> for SimError {
    fn from(e: CellError) -> Self {
        match e {
            CellError::InvalidParameter { key, reason } => SimError::parameter(key, reason),
            CellError::InvalidCurve { what } => SimError::parameter("ocv_table", what),
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => {
                SimError::parameter(what, format!("must be finite, got {value}"))
            }
            CoreError::InvalidArg { what } => SimError::InvalidArg { what },
        }
    }
}
