//! Shared application service layer for cellflow.
//!
//! This crate provides the single entry point used by the CLI and by library
//! callers: parameter-map parsing with defaults, run-config loading,
//! simulation execution, charge metrics and a background worker.

pub mod config;
pub mod error;
pub mod metrics;
pub mod params;
pub mod run_service;
pub mod worker;

// Re-export key types for convenience
pub use config::RunConfig;
pub use error::{AppError, AppResult};
pub use metrics::{ChargeMetrics, compute_charge_metrics, delivered_soc};
pub use params::{PARAMETER_KEYS, ParamSpec, ParamValue, ParameterMap, parse_assignment};
pub use run_service::{SimulationResult, run_config, run_simulation, run_simulation_with_progress};
pub use worker::{SimulationWorker, WorkerMessage};

pub use cf_cell::PolicyId;
pub use cf_sim::{SimStatus, Trajectory};
