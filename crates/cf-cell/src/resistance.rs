//! Internal resistance as a function of cell temperature.

use cf_core::constants::R_GAS;

use crate::error::{CellError, CellResult};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ResistanceModel {
    /// `R = R0` regardless of temperature.
    #[default]
    Constant,
    /// `R = R0·exp(ea_over_r·(1/T − 1/t_ref))`.
    Arrhenius { ea_over_r: f64, t_ref: f64 },
}

impl ResistanceModel {
    pub const DEFAULT_EA: f64 = 0.7;
    pub const DEFAULT_T_REF: f64 = 298.0;

    /// Arrhenius model with activation energy `ea` (J/mol).
    pub fn arrhenius(ea: f64, t_ref: f64) -> Self {
        ResistanceModel::Arrhenius {
            ea_over_r: ea / R_GAS,
            t_ref,
        }
    }

    pub fn parse(raw: &str, ea: f64, t_ref: f64) -> CellResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "constant" | "const" => Ok(ResistanceModel::Constant),
            "arrhenius" => Ok(Self::arrhenius(ea, t_ref)),
            other => Err(CellError::InvalidParameter {
                key: "resistance_model",
                reason: format!("expected 'constant' or 'arrhenius', got '{other}'"),
            }),
        }
    }

    pub fn resistance(&self, r0: f64, temperature: f64) -> f64 {
        match *self {
            ResistanceModel::Constant => r0,
            ResistanceModel::Arrhenius { ea_over_r, t_ref } => {
                r0 * (ea_over_r * (1.0 / temperature - 1.0 / t_ref)).exp()
            }
        }
    }

    pub fn validate(&self) -> CellResult<()> {
        if let ResistanceModel::Arrhenius { ea_over_r, t_ref } = *self {
            cf_core::ensure_finite(ea_over_r, "Ea_R")?;
            cf_core::ensure_positive(t_ref, "T_ref")?;
        }
        Ok(())
    }
}
