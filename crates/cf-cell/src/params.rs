//! Typed cell parameters.

use cf_core::constants::SECONDS_PER_HOUR;

use crate::error::{CellError, CellResult, ensure_non_negative};
use crate::ocv::OcvCurve;
use crate::rc::RcBranch;
use crate::resistance::ResistanceModel;
use crate::sei::SeiParams;
use crate::thermal::ThermalParams;

/// Default values for the cell, named after their parameter keys.
pub mod defaults {
    pub const SOC0: f64 = 0.0;
    pub const T0: f64 = 298.0;
    pub const SEI0: f64 = 0.0;
    pub const R0: f64 = 0.03;
    pub const C_NOM: f64 = 3.0;
}

/// State the cell starts the run in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialConditions {
    pub soc: f64,
    /// Kelvin
    pub temperature: f64,
    pub sei: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            soc: defaults::SOC0,
            temperature: defaults::T0,
            sei: defaults::SEI0,
        }
    }
}

impl InitialConditions {
    pub fn validate(&self) -> CellResult<()> {
        if !(0.0..=1.0).contains(&self.soc) {
            return Err(CellError::InvalidParameter {
                key: "soc0",
                reason: format!("must lie in [0, 1], got {}", self.soc),
            });
        }
        cf_core::ensure_positive(self.temperature, "T0")?;
        ensure_non_negative(self.sei, "sei0")?;
        Ok(())
    }
}

/// Everything the derivative function needs to know about the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellParams {
    /// Nominal capacity (Ah)
    pub capacity_ah: f64,
    /// Reference internal resistance (Ω)
    pub r0: f64,
    pub resistance: ResistanceModel,
    pub thermal: ThermalParams,
    pub sei: SeiParams,
    /// Polarization branch; `None` disables the transient state.
    pub transient: Option<RcBranch>,
    pub ocv: OcvCurve,
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            capacity_ah: defaults::C_NOM,
            r0: defaults::R0,
            resistance: ResistanceModel::default(),
            thermal: ThermalParams::default(),
            sei: SeiParams::default(),
            transient: None,
            ocv: OcvCurve::default(),
        }
    }
}

impl CellParams {
    /// Capacity in coulombs (`C_nom · 3600`).
    pub fn capacity_coulombs(&self) -> f64 {
        self.capacity_ah * SECONDS_PER_HOUR
    }

    /// Internal resistance at `temperature`.
    pub fn resistance_at(&self, temperature: f64) -> f64 {
        self.resistance.resistance(self.r0, temperature)
    }

    pub fn validate(&self) -> CellResult<()> {
        cf_core::ensure_positive(self.capacity_ah, "C_nom")?;
        cf_core::ensure_positive(self.r0, "R0")?;
        self.resistance.validate()?;
        self.thermal.validate()?;
        self.sei.validate()?;
        if let Some(rc) = &self.transient {
            rc.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(CellParams::default().validate().is_ok());
        assert!(InitialConditions::default().validate().is_ok());
    }

    #[test]
    fn capacity_in_coulombs() {
        let p = CellParams::default();
        assert_eq!(p.capacity_coulombs(), 10_800.0);
    }

    #[test]
    fn zero_resistance_names_r0() {
        let p = CellParams {
            r0: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(CellError::InvalidParameter { key: "R0", .. })
        ));
    }

    #[test]
    fn negative_capacity_names_c_nom() {
        let p = CellParams {
            capacity_ah: -3.0,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(CellError::InvalidParameter { key: "C_nom", .. })
        ));
    }

    #[test]
    fn transient_branch_is_validated_when_enabled() {
        let p = CellParams {
            transient: Some(RcBranch {
                resistance: 0.008,
                capacitance: -1.0,
            }),
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(CellError::InvalidParameter { key: "Ctr", .. })
        ));
    }

    #[test]
    fn initial_soc_must_be_a_fraction() {
        for soc in [-3.0, -1e-9, 1.0 + 1e-9, 5.0, f64::NAN] {
            let ic = InitialConditions {
                soc,
                ..Default::default()
            };
            assert!(
                matches!(
                    ic.validate(),
                    Err(CellError::InvalidParameter { key: "soc0", .. })
                ),
                "soc0 = {soc}"
            );
        }
        for soc in [0.0, 0.5, 1.0] {
            let ic = InitialConditions {
                soc,
                ..Default::default()
            };
            assert!(ic.validate().is_ok());
        }
    }

    #[test]
    fn initial_conditions_reject_negative_sei() {
        let ic = InitialConditions {
            sei: -1e-9,
            ..Default::default()
        };
        assert!(matches!(
            ic.validate(),
            Err(CellError::InvalidParameter { key: "sei0", .. })
        ));
    }
}
