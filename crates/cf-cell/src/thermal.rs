//! Lumped thermal balance: Joule heating against Newtonian cooling.

use crate::error::{CellResult, ensure_non_negative};

/// Lumped-capacitance thermal parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalParams {
    /// Thermal mass (kg)
    pub mass: f64,
    /// Specific heat (J/(kg·K))
    pub specific_heat: f64,
    /// Newtonian cooling coefficient (1/s)
    pub cooling_coefficient: f64,
    /// Ambient temperature (K)
    pub t_ambient: f64,
    /// Add the overpotential heating term `I·(V_source − V)`.
    pub cross_term: bool,
}

impl Default for ThermalParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            specific_heat: 0.5,
            cooling_coefficient: 3.0,
            t_ambient: 298.0,
            cross_term: false,
        }
    }
}

/// Instantaneous electrical quantities driving the heat balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalInput {
    pub current: f64,
    pub resistance: f64,
    pub source_voltage: f64,
    pub voltage: f64,
    pub temperature: f64,
}

impl ThermalParams {
    /// Heat capacity `m·c` (J/K).
    pub fn heat_capacity(&self) -> f64 {
        self.mass * self.specific_heat
    }

    /// dT/dt (K/s).
    pub fn dtdt(&self, input: &ThermalInput) -> f64 {
        let mut heat = input.current * input.current * input.resistance;
        if self.cross_term {
            heat += input.current * (input.source_voltage - input.voltage);
        }
        heat / self.heat_capacity()
            - self.cooling_coefficient * (input.temperature - self.t_ambient)
    }

    pub fn validate(&self) -> CellResult<()> {
        cf_core::ensure_positive(self.mass, "mass")?;
        cf_core::ensure_positive(self.specific_heat, "specific_heat")?;
        ensure_non_negative(self.cooling_coefficient, "cooling_coefficient")?;
        cf_core::ensure_positive(self.t_ambient, "T_ambient")?;
        Ok(())
    }
}
