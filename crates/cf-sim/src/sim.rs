//! Charge driver: stepping, sampling and termination.

use cf_core::{Tolerances, nearly_equal};
use tracing::{debug, info, warn};

use crate::cell_model::{CellModel, DerivedState, IntegratedState};
use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;
use crate::trajectory::{SimStatus, Trajectory};

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

impl IntegratorType {
    pub fn parse(raw: &str) -> SimResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rk4" => Ok(IntegratorType::RK4),
            "euler" | "forward_euler" => Ok(IntegratorType::ForwardEuler),
            other => Err(SimError::parameter(
                "integrator",
                format!("expected 'rk4' or 'euler', got '{other}'"),
            )),
        }
    }

    fn step(
        &self,
        model: &CellModel,
        t: f64,
        x: &IntegratedState,
        dt: f64,
    ) -> SimResult<IntegratedState> {
        match self {
            IntegratorType::RK4 => RK4.step(model, t, x, dt),
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
        }
    }
}

/// Options for charge runs.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Simulated-time cap (seconds)
    pub t_max: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Run completes once SOC reaches this value
    pub soc_threshold: f64,
    /// Initial sampling stride in steps
    pub record_every: usize,
    /// Upper bound on samples kept; the stride doubles each time it is reached
    pub max_points: usize,
    /// Append the state that crossed the threshold
    pub include_final_sample: bool,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 0.1,
            t_max: 36_000.0,
            max_steps: 1_000_000,
            soc_threshold: 0.999,
            record_every: 1,
            max_points: 5_000,
            include_final_sample: false,
            integrator: IntegratorType::default(),
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        cf_core::ensure_positive(self.dt, "dt").map_err(|_| {
            SimError::parameter("dt", format!("must be finite and positive, got {}", self.dt))
        })?;
        cf_core::ensure_positive(self.t_max, "t_max").map_err(|_| {
            SimError::parameter("t_max", format!("must be finite and positive, got {}", self.t_max))
        })?;
        cf_core::ensure_finite(self.soc_threshold, "soc_threshold")?;
        if self.max_steps == 0 {
            return Err(SimError::parameter("max_steps", "must be at least 1"));
        }
        if self.record_every == 0 {
            return Err(SimError::parameter("record_every", "must be at least 1"));
        }
        if self.max_points == 0 {
            return Err(SimError::parameter("max_points", "must be at least 1"));
        }
        Ok(())
    }

    /// Most steps a run can take before a cap triggers.
    pub fn step_cap(&self) -> usize {
        let ratio = self.t_max / self.dt;
        let by_time = if nearly_equal(ratio, ratio.round(), Tolerances::default()) {
            ratio.round()
        } else {
            ratio.ceil()
        };
        if by_time >= self.max_steps as f64 {
            self.max_steps
        } else {
            by_time as usize
        }
    }

    /// True once simulated time `t` has reached the time cap, allowing for
    /// the rounding in `steps * dt`.
    pub fn time_cap_reached(&self, t: f64) -> bool {
        t >= self.t_max || nearly_equal(t, self.t_max, Tolerances::default())
    }
}

/// Progress snapshot, emitted whenever a sample is recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    pub step: usize,
    pub step_cap: usize,
    pub sim_time: f64,
    pub soc: f64,
}

impl SimProgress {
    pub fn fraction_of_cap(&self) -> f64 {
        if self.step_cap == 0 {
            return 1.0;
        }
        self.step as f64 / self.step_cap as f64
    }
}

/// Outcome of one charge run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRun {
    pub status: SimStatus,
    /// Steps accepted
    pub steps: usize,
    /// Simulated time at termination (seconds)
    pub final_time: f64,
    pub trajectory: Trajectory,
    /// Why the run stopped, when it did not complete
    pub diagnostic: Option<String>,
}

/// Run a charge simulation to completion or a cap.
pub fn run_charge(model: &CellModel, opts: &SimOptions) -> SimResult<ChargeRun> {
    run_charge_with_progress(model, opts, |_| {})
}

/// Like [`run_charge`], calling `on_progress` at every recorded sample.
///
/// Each iteration checks termination, records the pre-step state (subject to
/// the stride), advances the integrated state one step and recomputes the
/// derived state. A step that produces a non-finite or non-physical state is
/// discarded and the run ends with [`SimStatus::NumericDivergence`].
///
/// Sampling starts every `record_every` steps. When the trajectory holds
/// `max_points` samples, every other sample is dropped and the stride
/// doubles, so the output stays evenly spaced and bounded for any `dt`.
pub fn run_charge_with_progress<F>(
    model: &CellModel,
    opts: &SimOptions,
    mut on_progress: F,
) -> SimResult<ChargeRun>
where
    F: FnMut(&SimProgress),
{
    opts.validate()?;

    let step_cap = opts.step_cap();
    let mut stride = opts.record_every;
    debug!(
        policy = %model.policy().label(),
        dt = opts.dt,
        t_max = opts.t_max,
        max_steps = opts.max_steps,
        max_points = opts.max_points,
        integrator = ?opts.integrator,
        "starting charge run"
    );

    let capacity = (step_cap / stride).min(opts.max_points) + 1;
    let mut trajectory = Trajectory::with_capacity(capacity, model.has_transient());

    let mut x = model.initial_state();
    let mut derived = model.initial_derived();
    let mut t = 0.0;
    let mut steps = 0usize;

    let (status, diagnostic) = loop {
        if x.soc >= opts.soc_threshold {
            if opts.include_final_sample {
                if trajectory.len() >= opts.max_points {
                    trajectory.decimate();
                }
                trajectory.push(t, &x, &derived);
            }
            break (SimStatus::Completed, None);
        }
        if steps >= opts.max_steps || opts.time_cap_reached(t) {
            let why = format!(
                "SOC {:.6} below threshold {} after {steps} steps (t = {t} s)",
                x.soc, opts.soc_threshold
            );
            break (SimStatus::NonConverged, Some(why));
        }

        if steps % stride == 0 && trajectory.len() >= opts.max_points {
            trajectory.decimate();
            stride *= 2;
            debug!(step = steps, stride, "trajectory decimated");
        }
        if steps % stride == 0 && trajectory.len() < opts.max_points {
            trajectory.push(t, &x, &derived);
            on_progress(&SimProgress {
                step: steps,
                step_cap,
                sim_time: t,
                soc: x.soc,
            });
        }

        let t_next = (steps + 1) as f64 * opts.dt;
        let next = match opts.integrator.step(model, t, &x, opts.dt) {
            Ok(next) => next,
            Err(e) => break (SimStatus::NumericDivergence, Some(format!("{e} at t = {t} s"))),
        };
        if let Some(bad) = next.first_non_finite() {
            break (
                SimStatus::NumericDivergence,
                Some(format!("{bad} became non-finite at t = {t_next} s")),
            );
        }
        if next.temperature <= 0.0 {
            break (
                SimStatus::NumericDivergence,
                Some(format!(
                    "temperature fell to {} K at t = {t_next} s",
                    next.temperature
                )),
            );
        }
        let next_derived = match refresh(model, t_next, &next) {
            Ok(d) => d,
            Err(why) => break (SimStatus::NumericDivergence, Some(why)),
        };

        x = next;
        derived = next_derived;
        steps += 1;
        t = t_next;
    };

    match status {
        SimStatus::Completed => info!(steps, final_time = t, soc = x.soc, "charge run completed"),
        SimStatus::NonConverged => warn!(steps, final_time = t, soc = x.soc, "charge run hit its cap"),
        SimStatus::NumericDivergence => warn!(
            steps,
            diagnostic = diagnostic.as_deref().unwrap_or_default(),
            "charge run diverged"
        ),
    }

    Ok(ChargeRun {
        status,
        steps,
        final_time: t,
        trajectory,
        diagnostic,
    })
}

/// Recompute the derived state at an accepted step.
fn refresh(model: &CellModel, t: f64, x: &IntegratedState) -> Result<DerivedState, String> {
    let derived = model
        .evaluate(t, x)
        .map_err(|e| format!("{e} at t = {t} s"))?
        .derived;
    if !derived.current.is_finite() {
        return Err(format!("current became non-finite at t = {t} s"));
    }
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.dt, 0.1);
        assert_eq!(opts.t_max, 36_000.0);
        assert_eq!(opts.max_steps, 1_000_000);
        assert_eq!(opts.record_every, 1);
        assert!(!opts.include_final_sample);
    }

    #[test]
    fn sim_options_invalid() {
        let opts = SimOptions {
            dt: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(SimError::InvalidParameter { ref key, .. }) if key == "dt"
        ));
        let opts = SimOptions {
            max_steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(SimError::InvalidParameter { ref key, .. }) if key == "max_steps"
        ));
        let opts = SimOptions {
            t_max: f64::NAN,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn step_cap_is_tighter_of_two_limits() {
        let opts = SimOptions {
            dt: 1.0,
            t_max: 50.0,
            max_steps: 100,
            ..Default::default()
        };
        assert_eq!(opts.step_cap(), 50);
        let opts = SimOptions {
            dt: 1.0,
            t_max: 500.0,
            max_steps: 100,
            ..Default::default()
        };
        assert_eq!(opts.step_cap(), 100);
    }

    #[test]
    fn time_cap_tolerates_step_rounding() {
        // 3 * 0.3 = 0.8999999999999999
        let opts = SimOptions {
            dt: 0.3,
            t_max: 0.9,
            ..Default::default()
        };
        assert!(opts.time_cap_reached(3.0 * 0.3));
        assert!(!opts.time_cap_reached(2.0 * 0.3));
        assert_eq!(opts.step_cap(), 3);

        // 2.1 / 0.7 = 3.0000000000000004
        let opts = SimOptions {
            dt: 0.7,
            t_max: 2.1,
            ..Default::default()
        };
        assert_eq!(opts.step_cap(), 3);
    }

    #[test]
    fn parse_integrator() {
        assert_eq!(IntegratorType::parse("RK4"), Ok(IntegratorType::RK4));
        assert_eq!(IntegratorType::parse("euler"), Ok(IntegratorType::ForwardEuler));
        assert!(IntegratorType::parse("midpoint").is_err());
    }
}
