//! Solid-electrolyte interphase (SEI) growth.
//!
//! Growth rate is an Arrhenius factor in temperature times a stress
//! multiplier. Two stress laws are available:
//!
//! - [`SeiModel::Simplified`]: `(1 + 2·soc²)(1 + 0.1·|I|)`, SOC clipped to `[0, 1]`
//! - [`SeiModel::Full`]: `A·exp(γ(U_ref − U))·(1 + β·|I|)^ν`, with `U` the
//!   terminal voltage
//!
//! Both are non-negative for every finite input, so SEI never shrinks.

use cf_core::constants::R_GAS;

use crate::error::{CellError, CellResult, ensure_non_negative};

/// Stress law selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeiModel {
    Simplified,
    #[default]
    Full,
}

impl SeiModel {
    pub fn parse(raw: &str) -> CellResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "simplified" | "simple" => Ok(SeiModel::Simplified),
            "full" => Ok(SeiModel::Full),
            other => Err(CellError::InvalidParameter {
                key: "sei_model",
                reason: format!("expected 'full' or 'simplified', got '{other}'"),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeiModel::Simplified => "simplified",
            SeiModel::Full => "full",
        }
    }

    /// Rate constant the model is calibrated for (1/s).
    pub fn default_k0(&self) -> f64 {
        match self {
            SeiModel::Simplified => 1e-12,
            SeiModel::Full => 1e-7,
        }
    }
}

/// Constants of the full stress law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullStress {
    pub a: f64,
    pub gamma: f64,
    pub beta: f64,
    pub nu: f64,
    /// Reference potential (V)
    pub u_ref: f64,
}

impl Default for FullStress {
    fn default() -> Self {
        Self {
            a: 1.0,
            gamma: 0.5,
            beta: 0.1,
            nu: 1.0,
            u_ref: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeiParams {
    pub model: SeiModel,
    /// Pre-exponential rate constant (1/s)
    pub k0: f64,
    /// Activation energy (J/mol)
    pub ea: f64,
    pub stress: FullStress,
}

impl Default for SeiParams {
    fn default() -> Self {
        Self::for_model(SeiModel::default())
    }
}

impl SeiParams {
    pub fn for_model(model: SeiModel) -> Self {
        Self {
            model,
            k0: model.default_k0(),
            ea: 3.0e4,
            stress: FullStress::default(),
        }
    }

    /// `k0·exp(−Ea/(R·T))`.
    pub fn arrhenius(&self, temperature: f64) -> f64 {
        self.k0 * (-self.ea / (R_GAS * temperature)).exp()
    }

    /// Stress multiplier for the selected model.
    pub fn stress(&self, soc: f64, current: f64, voltage: f64) -> f64 {
        match self.model {
            SeiModel::Simplified => {
                let soc = soc.clamp(0.0, 1.0);
                (1.0 + 2.0 * soc * soc) * (1.0 + 0.1 * current.abs())
            }
            SeiModel::Full => {
                let s = self.stress;
                s.a * (s.gamma * (s.u_ref - voltage)).exp()
                    * (1.0 + s.beta * current.abs()).powf(s.nu)
            }
        }
    }

    /// dSEI/dt.
    pub fn growth_rate(&self, temperature: f64, soc: f64, current: f64, voltage: f64) -> f64 {
        self.arrhenius(temperature) * self.stress(soc, current, voltage)
    }

    pub fn validate(&self) -> CellResult<()> {
        ensure_non_negative(self.k0, "k0")?;
        ensure_non_negative(self.ea, "Ea")?;
        if self.model == SeiModel::Full {
            ensure_non_negative(self.stress.a, "sei_A")?;
            cf_core::ensure_finite(self.stress.gamma, "sei_gamma")?;
            ensure_non_negative(self.stress.beta, "sei_beta")?;
            cf_core::ensure_finite(self.stress.nu, "sei_nu")?;
            cf_core::ensure_finite(self.stress.u_ref, "sei_U_ref")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_models() {
        assert_eq!(SeiModel::parse("Full"), Ok(SeiModel::Full));
        assert_eq!(SeiModel::parse("simplified"), Ok(SeiModel::Simplified));
        assert!(SeiModel::parse("fancy").is_err());
    }

    #[test]
    fn default_k0_follows_model() {
        assert_eq!(SeiParams::for_model(SeiModel::Full).k0, 1e-7);
        assert_eq!(SeiParams::for_model(SeiModel::Simplified).k0, 1e-12);
    }

    #[test]
    fn simplified_stress_clips_soc() {
        let p = SeiParams::for_model(SeiModel::Simplified);
        assert_eq!(p.stress(0.0, 0.0, 3.3), 1.0);
        assert!((p.stress(1.0, 10.0, 3.3) - 6.0).abs() < 1e-12);
        assert_eq!(p.stress(1.5, 10.0, 3.3), p.stress(1.0, 10.0, 3.3));
    }

    #[test]
    fn full_stress_falls_with_voltage() {
        let p = SeiParams::default();
        assert!(p.stress(0.5, 0.0, 3.0) > p.stress(0.5, 0.0, 3.5));
        assert!(p.stress(0.5, 20.0, 3.3) > p.stress(0.5, 0.0, 3.3));
    }

    #[test]
    fn rate_rises_with_temperature() {
        let p = SeiParams::default();
        assert!(p.growth_rate(320.0, 0.5, 5.0, 3.3) > p.growth_rate(298.0, 0.5, 5.0, 3.3));
    }

    #[test]
    fn validation_names_key() {
        let p = SeiParams {
            k0: -1.0,
            ..Default::default()
        };
        assert!(p.validate().unwrap_err().to_string().contains("'k0'"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn growth_rate_is_non_negative(
            t in 200.0_f64..400.0,
            soc in -0.5_f64..1.5,
            current in -200.0_f64..200.0,
            voltage in 2.0_f64..5.0,
            simplified in any::<bool>(),
        ) {
            let model = if simplified { SeiModel::Simplified } else { SeiModel::Full };
            let p = SeiParams::for_model(model);
            let rate = p.growth_rate(t, soc, current, voltage);
            prop_assert!(rate.is_finite());
            prop_assert!(rate >= 0.0);
        }
    }
}
