//! First-order RC polarization branch.

use crate::error::CellResult;

/// Series RC pair modelling diffusion overpotential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcBranch {
    /// Branch resistance (Ω)
    pub resistance: f64,
    /// Branch capacitance (F)
    pub capacitance: f64,
}

impl Default for RcBranch {
    fn default() -> Self {
        Self {
            resistance: 0.008,
            capacitance: 5000.0,
        }
    }
}

impl RcBranch {
    pub fn new(resistance: f64, capacitance: f64) -> CellResult<Self> {
        let branch = Self {
            resistance,
            capacitance,
        };
        branch.validate()?;
        Ok(branch)
    }

    pub fn validate(&self) -> CellResult<()> {
        cf_core::ensure_positive(self.resistance, "Rtr")?;
        cf_core::ensure_positive(self.capacitance, "Ctr")?;
        Ok(())
    }

    /// Time constant `R·C` (s).
    pub fn time_constant(&self) -> f64 {
        self.resistance * self.capacitance
    }

    /// dVc/dt for branch voltage `vc` under `current`.
    pub fn dvdt(&self, vc: f64, current: f64) -> f64 {
        -vc / self.time_constant() + current / self.capacitance
    }

    /// Branch voltage once `current` has been held long enough to settle.
    pub fn steady_state(&self, current: f64) -> f64 {
        current * self.resistance
    }
}
