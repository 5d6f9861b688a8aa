//! Charge policies: commanded source voltage as a function of time and state.
//!
//! Constant-current style policies are realised as voltage control, the way a
//! real charger regulates current: `V_source = I_cmd * R + OCV(soc)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CellResult, ensure_non_negative};

/// Policy identifier as supplied by a caller.
///
/// Parsing never fails: anything outside the known set becomes
/// [`PolicyId::Unrecognized`], which runs the open-circuit fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyId {
    Cv,
    Cc,
    Cccv,
    Pulse,
    Sine,
    Unrecognized(String),
}

impl PolicyId {
    /// The recognized policies, in display order.
    pub const KNOWN: [PolicyId; 5] = [
        PolicyId::Cv,
        PolicyId::Cc,
        PolicyId::Cccv,
        PolicyId::Pulse,
        PolicyId::Sine,
    ];

    /// Parse an identifier, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "cv" => PolicyId::Cv,
            "cc" => PolicyId::Cc,
            "cccv" => PolicyId::Cccv,
            "pulse" => PolicyId::Pulse,
            "sine" | "sinusoidal" => PolicyId::Sine,
            _ => PolicyId::Unrecognized(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PolicyId::Cv => "CV",
            PolicyId::Cc => "CC",
            PolicyId::Cccv => "CCCV",
            PolicyId::Pulse => "Pulse",
            PolicyId::Sine => "Sine",
            PolicyId::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PolicyId::Unrecognized(_))
    }

    /// Parameter keys the policy consumes.
    pub fn parameter_keys(&self) -> &'static [&'static str] {
        match self {
            PolicyId::Cv => &["Vset"],
            PolicyId::Cc => &["Iset"],
            PolicyId::Cccv => &["Iset", "Vset"],
            PolicyId::Pulse => &["Iset", "t_on", "t_off", "Vset"],
            PolicyId::Sine => &["I_amp", "freq"],
            PolicyId::Unrecognized(_) => &[],
        }
    }
}

impl From<&str> for PolicyId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for PolicyId {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<PolicyId> for String {
    fn from(id: PolicyId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy constants shared by all policy kinds. Each kind reads its own subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicySettings {
    /// Set-point voltage (V)
    pub v_set: f64,
    /// Commanded current (A)
    pub i_set: f64,
    /// Pulse on window (s)
    pub t_on: f64,
    /// Pulse off window (s)
    pub t_off: f64,
    /// Sine amplitude (A)
    pub i_amp: f64,
    /// Sine frequency (Hz)
    pub freq: f64,
    /// Cap the pulse on-window voltage at `v_set`
    pub pulse_cap: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            v_set: 4.2,
            i_set: 20.0,
            t_on: 2.0,
            t_off: 0.25,
            i_amp: 60.0,
            freq: 4.0,
            pulse_cap: false,
        }
    }
}

/// Closed set of charge control laws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargePolicy {
    /// Fixed source voltage.
    ConstantVoltage { v_set: f64 },
    /// Fixed commanded current.
    ConstantCurrent { i_set: f64 },
    /// Constant current until OCV reaches `v_set`, then constant voltage.
    CcCv { i_set: f64, v_set: f64 },
    /// Square wave: constant current during `t_on`, open circuit during `t_off`.
    Pulse {
        i_set: f64,
        t_on: f64,
        t_off: f64,
        v_cap: Option<f64>,
    },
    /// Rectified sine current `i_amp * |sin(2π·freq·t)|`.
    Sine { i_amp: f64, freq: f64 },
    /// No charging: source voltage tracks OCV.
    OpenCircuit,
}

/// What a policy may observe when choosing its voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyInput {
    pub t: f64,
    pub soc: f64,
    pub ocv: f64,
    pub resistance: f64,
}

impl ChargePolicy {
    /// Select the policy for `id`. Unrecognized ids get [`ChargePolicy::OpenCircuit`].
    pub fn from_id(id: &PolicyId, settings: &PolicySettings) -> Self {
        match id {
            PolicyId::Cv => ChargePolicy::ConstantVoltage {
                v_set: settings.v_set,
            },
            PolicyId::Cc => ChargePolicy::ConstantCurrent {
                i_set: settings.i_set,
            },
            PolicyId::Cccv => ChargePolicy::CcCv {
                i_set: settings.i_set,
                v_set: settings.v_set,
            },
            PolicyId::Pulse => ChargePolicy::Pulse {
                i_set: settings.i_set,
                t_on: settings.t_on,
                t_off: settings.t_off,
                v_cap: settings.pulse_cap.then_some(settings.v_set),
            },
            PolicyId::Sine => ChargePolicy::Sine {
                i_amp: settings.i_amp,
                freq: settings.freq,
            },
            PolicyId::Unrecognized(_) => ChargePolicy::OpenCircuit,
        }
    }

    /// Commanded source voltage.
    pub fn source_voltage(&self, input: &PolicyInput) -> f64 {
        let drive = |current: f64| current * input.resistance + input.ocv;
        match *self {
            ChargePolicy::ConstantVoltage { v_set } => v_set,
            ChargePolicy::ConstantCurrent { i_set } => drive(i_set),
            ChargePolicy::CcCv { i_set, v_set } => {
                // Phase follows OCV each call; no latch.
                if input.ocv < v_set {
                    drive(i_set)
                } else {
                    v_set
                }
            }
            ChargePolicy::Pulse {
                i_set,
                t_on,
                t_off,
                v_cap,
            } => {
                if pulse_on(input.t, t_on, t_off) {
                    let v = drive(i_set);
                    v_cap.map_or(v, |cap| v.min(cap))
                } else {
                    input.ocv
                }
            }
            ChargePolicy::Sine { i_amp, freq } => drive(sine_current(i_amp, freq, input.t)),
            ChargePolicy::OpenCircuit => input.ocv,
        }
    }

    /// Check the constants this policy reads.
    pub fn validate(&self) -> CellResult<()> {
        match *self {
            ChargePolicy::ConstantVoltage { v_set } => {
                cf_core::ensure_finite(v_set, "Vset")?;
            }
            ChargePolicy::ConstantCurrent { i_set } => {
                cf_core::ensure_finite(i_set, "Iset")?;
            }
            ChargePolicy::CcCv { i_set, v_set } => {
                cf_core::ensure_finite(i_set, "Iset")?;
                cf_core::ensure_finite(v_set, "Vset")?;
            }
            ChargePolicy::Pulse {
                i_set,
                t_on,
                t_off,
                v_cap,
            } => {
                cf_core::ensure_finite(i_set, "Iset")?;
                ensure_non_negative(t_on, "t_on")?;
                ensure_non_negative(t_off, "t_off")?;
                if let Some(cap) = v_cap {
                    cf_core::ensure_finite(cap, "Vset")?;
                }
            }
            ChargePolicy::Sine { i_amp, freq } => {
                cf_core::ensure_finite(i_amp, "I_amp")?;
                ensure_non_negative(freq, "freq")?;
            }
            ChargePolicy::OpenCircuit => {}
        }
        Ok(())
    }

    /// Short human label, e.g. `CC_20A` or `CCCV_20A_4.2V`.
    pub fn label(&self) -> String {
        match *self {
            ChargePolicy::ConstantVoltage { v_set } => format!("CV_{v_set}V"),
            ChargePolicy::ConstantCurrent { i_set } => format!("CC_{i_set}A"),
            ChargePolicy::CcCv { i_set, v_set } => format!("CCCV_{i_set}A_{v_set}V"),
            ChargePolicy::Pulse {
                i_set, t_on, t_off, ..
            } => format!("Pulse_{i_set}A_{t_on}s_on_{t_off}s_off"),
            ChargePolicy::Sine { i_amp, freq } => format!("Sine_{i_amp}A_{freq}Hz"),
            ChargePolicy::OpenCircuit => "OpenCircuit".to_string(),
        }
    }
}

/// True while `t` falls in the on window of a `t_on + t_off` period.
pub fn pulse_on(t: f64, t_on: f64, t_off: f64) -> bool {
    let period = t_on + t_off;
    if period <= 0.0 {
        return false;
    }
    t.rem_euclid(period) < t_on
}

/// Rectified sine current at time `t`.
pub fn sine_current(i_amp: f64, freq: f64, t: f64) -> f64 {
    i_amp * (2.0 * std::f64::consts::PI * freq * t).sin().abs()
}
