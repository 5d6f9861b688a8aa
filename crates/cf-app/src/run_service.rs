//! Run execution service: the single entry point for a charge simulation.

use cf_cell::{ChargePolicy, OcvCurve, PolicyId};
use cf_sim::{CellModel, SimProgress, SimStatus, Trajectory, run_charge_with_progress};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::AppResult;
use crate::params::{self, ParameterMap};

/// Everything a consumer needs from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub status: SimStatus,
    /// Policy as requested
    pub policy: PolicyId,
    /// Label of the control law that actually ran
    pub policy_label: String,
    /// Set to the requested id when it was not recognized and the run fell back to open circuit
    pub policy_fallback: Option<String>,
    pub steps: usize,
    /// Simulated time at termination (seconds)
    pub final_time: f64,
    /// Ambient temperature the run was resolved with (K)
    pub t_ambient: f64,
    pub trajectory: Trajectory,
    pub diagnostic: Option<String>,
}

/// Run one simulation with the default OCV curve.
///
/// Missing keys take their defaults. Parameter failures are returned as
/// errors naming the key; caps and divergence are reported through
/// [`SimulationResult::status`].
pub fn run_simulation(
    policy: impl Into<PolicyId>,
    parameters: &ParameterMap,
) -> AppResult<SimulationResult> {
    run_simulation_with_progress(policy.into(), parameters, None, |_| {})
}

/// Run the simulation described by a config file.
pub fn run_config(config: &RunConfig) -> AppResult<SimulationResult> {
    let ocv = config.ocv_curve()?;
    run_simulation_with_progress(config.policy.clone(), &config.parameters, ocv, |_| {})
}

/// Full form: custom OCV curve and a progress callback.
pub fn run_simulation_with_progress<F>(
    policy: PolicyId,
    parameters: &ParameterMap,
    ocv: Option<OcvCurve>,
    on_progress: F,
) -> AppResult<SimulationResult>
where
    F: FnMut(&SimProgress),
{
    let resolved = params::resolve(parameters, ocv)?;

    let policy_fallback = if policy.is_recognized() {
        None
    } else {
        warn!(policy = %policy, "unrecognized policy, running open circuit");
        Some(policy.to_string())
    };
    let law = ChargePolicy::from_id(&policy, &resolved.policy);
    let t_ambient = resolved.cell.thermal.t_ambient;

    let model = CellModel::new(resolved.cell, law, resolved.initial)?;
    let run = run_charge_with_progress(&model, &resolved.options, on_progress)?;

    info!(
        policy = %policy,
        status = %run.status,
        steps = run.steps,
        samples = run.trajectory.len(),
        "simulation finished"
    );

    Ok(SimulationResult {
        status: run.status,
        policy,
        policy_label: law.label(),
        policy_fallback,
        steps: run.steps,
        final_time: run.final_time,
        t_ambient,
        trajectory: run.trajectory,
        diagnostic: run.diagnostic,
    })
}
