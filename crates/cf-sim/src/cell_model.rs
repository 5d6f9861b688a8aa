//! Cell derivative model.
//!
//! The state is split in two:
//! - [`IntegratedState`] (SOC, temperature, SEI, RC voltage) is what the
//!   integrator advances.
//! - [`DerivedState`] (terminal voltage, current, resistance) is recomputed
//!   from the integrated state and never fed back into the stepper.

use cf_cell::{CellParams, ChargePolicy, InitialConditions, PolicyInput, ThermalInput};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;

/// Quantities advanced by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntegratedState {
    pub soc: f64,
    /// Kelvin
    pub temperature: f64,
    pub sei: f64,
    /// RC branch voltage; stays zero when the branch is disabled.
    pub transient: f64,
}

impl IntegratedState {
    /// Name of the first non-finite component, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("soc", self.soc),
            ("temperature", self.temperature),
            ("sei", self.sei),
            ("transient", self.transient),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Algebraic quantities, functions of the integrated state and time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedState {
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
}

/// One evaluation of the derivative function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub derivative: IntegratedState,
    pub derived: DerivedState,
    pub source_voltage: f64,
}

/// A cell under one charge policy. Built fresh for every run.
#[derive(Debug, Clone)]
pub struct CellModel {
    params: CellParams,
    policy: ChargePolicy,
    initial: InitialConditions,
}

impl CellModel {
    /// Validate everything the derivative function reads.
    pub fn new(
        params: CellParams,
        policy: ChargePolicy,
        initial: InitialConditions,
    ) -> SimResult<Self> {
        params.validate()?;
        policy.validate()?;
        initial.validate()?;
        Ok(Self {
            params,
            policy,
            initial,
        })
    }

    pub fn policy(&self) -> &ChargePolicy {
        &self.policy
    }

    pub fn has_transient(&self) -> bool {
        self.params.transient.is_some()
    }

    /// Derived state before the first step: OCV at the initial SOC and no current.
    pub fn initial_derived(&self) -> DerivedState {
        DerivedState {
            voltage: self.params.ocv.voltage(self.initial.soc),
            current: 0.0,
            resistance: self.params.resistance_at(self.initial.temperature),
        }
    }

    /// Evaluate the derivative function at `(t, x)`.
    pub fn evaluate(&self, t: f64, x: &IntegratedState) -> SimResult<Evaluation> {
        let p = &self.params;

        let voltage = p.ocv.voltage(x.soc);
        let resistance = p.resistance_at(x.temperature);
        if !(resistance.is_finite() && resistance > 0.0) {
            return Err(SimError::NonPhysical {
                what: format!("resistance {resistance} at T = {} K", x.temperature),
            });
        }

        let source_voltage = self.policy.source_voltage(&PolicyInput {
            t,
            soc: x.soc,
            ocv: voltage,
            resistance,
        });

        let vc = if p.transient.is_some() { x.transient } else { 0.0 };
        let current = (source_voltage - voltage - vc) / resistance;

        let d_temperature = p.thermal.dtdt(&ThermalInput {
            current,
            resistance,
            source_voltage,
            voltage,
            temperature: x.temperature,
        });
        let d_sei = p.sei.growth_rate(x.temperature, x.soc, current, voltage);
        let d_transient = p.transient.map_or(0.0, |rc| rc.dvdt(vc, current));

        Ok(Evaluation {
            derivative: IntegratedState {
                soc: current / p.capacity_coulombs(),
                temperature: d_temperature,
                sei: d_sei,
                transient: d_transient,
            },
            derived: DerivedState {
                voltage,
                current,
                resistance,
            },
            source_voltage,
        })
    }
}

impl TransientModel for CellModel {
    type State = IntegratedState;

    fn initial_state(&self) -> IntegratedState {
        IntegratedState {
            soc: self.initial.soc,
            temperature: self.initial.temperature,
            sei: self.initial.sei,
            transient: 0.0,
        }
    }

    fn rhs(&self, t: f64, x: &IntegratedState) -> SimResult<IntegratedState> {
        Ok(self.evaluate(t, x)?.derivative)
    }

    fn add(&self, a: &IntegratedState, b: &IntegratedState) -> IntegratedState {
        IntegratedState {
            soc: a.soc + b.soc,
            temperature: a.temperature + b.temperature,
            sei: a.sei + b.sei,
            transient: a.transient + b.transient,
        }
    }

    fn scale(&self, a: &IntegratedState, scale: f64) -> IntegratedState {
        IntegratedState {
            soc: a.soc * scale,
            temperature: a.temperature * scale,
            sei: a.sei * scale,
            transient: a.transient * scale,
        }
    }
}
