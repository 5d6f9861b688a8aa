//! Run-config files.
//!
//! A run config names a policy, a parameter map and optionally a custom OCV
//! table. YAML and JSON are supported, chosen by file extension.

use std::path::Path;

use cf_cell::{OcvCurve, PolicyId};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::params::ParameterMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub policy: PolicyId,
    #[serde(default)]
    pub parameters: ParameterMap,
    /// `(soc, volts)` breakpoints, descending in SOC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocv_table: Option<Vec<(f64, f64)>>,
}

impl RunConfig {
    pub fn new(policy: impl Into<PolicyId>) -> Self {
        Self {
            policy: policy.into(),
            parameters: ParameterMap::new(),
            ocv_table: None,
        }
    }

    /// Load from `.yaml`/`.yml` or `.json`.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(AppError::Config(format!(
                "unsupported config extension for {} (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// The validated custom curve, if one is configured.
    pub fn ocv_curve(&self) -> AppResult<Option<OcvCurve>> {
        match &self.ocv_table {
            None => Ok(None),
            Some(points) => Ok(Some(OcvCurve::new(points.clone())?)),
        }
    }
}
