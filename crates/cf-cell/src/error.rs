//! Error types for cell parameter and curve validation.

use cf_core::CoreError;
use thiserror::Error;

/// Errors raised while building or validating cell models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: &'static str, reason: String },

    #[error("Invalid OCV curve: {what}")]
    InvalidCurve { what: &'static str },
}

pub type CellResult<T> = Result<T, CellError>;

impl From<CoreError> for CellError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => CellError::InvalidParameter {
                key: what,
                reason: format!("must be finite, got {value}"),
            },
            CoreError::InvalidArg { what } => CellError::InvalidParameter {
                key: what,
                reason: "must be strictly positive".to_string(),
            },
        }
    }
}

/// Reject negative or non-finite values.
pub(crate) fn ensure_non_negative(v: f64, key: &'static str) -> CellResult<f64> {
    let v = cf_core::ensure_finite(v, key)?;
    if v < 0.0 {
        return Err(CellError::InvalidParameter {
            key,
            reason: format!("must be non-negative, got {v}"),
        });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_key() {
        let err = CellError::InvalidParameter {
            key: "R0",
            reason: "must be strictly positive".into(),
        };
        assert!(err.to_string().contains("R0"));
    }

    #[test]
    fn core_error_conversion_keeps_key() {
        let err: CellError = CoreError::InvalidArg { what: "dt" }.into();
        assert!(matches!(err, CellError::InvalidParameter { key: "dt", .. }));
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative(0.0, "t_on"), Ok(0.0));
        assert!(ensure_non_negative(-0.1, "t_on").is_err());
        assert!(ensure_non_negative(f64::NAN, "t_on").is_err());
    }
}
