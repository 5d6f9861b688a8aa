//! Parameter map parsing.
//!
//! Callers pass a flat `key -> number|string` map. Every recognized key has a
//! default listed in [`PARAMETER_KEYS`]; missing keys fall back to it and
//! unknown keys are ignored with a warning.

use std::collections::BTreeMap;
use std::fmt;

use cf_cell::params::defaults;
use cf_cell::{
    CellParams, FullStress, InitialConditions, OcvCurve, PolicySettings, RcBranch,
    ResistanceModel, SeiModel, SeiParams, ThermalParams,
};
use cf_sim::{IntegratorType, SimOptions};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

/// A single parameter value: a switch, a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Parse a command-line style value: numbers when they parse, text otherwise.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) => ParamValue::Number(v),
            Err(_) => ParamValue::Text(raw.trim().to_string()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

pub type ParameterMap = BTreeMap<String, ParamValue>;

/// Documentation entry for one recognized key.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

const fn entry(key: &'static str, default: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec {
        key,
        default,
        description,
    }
}

/// Every recognized key with its default.
pub const PARAMETER_KEYS: &[ParamSpec] = &[
    entry("soc0", "0.0", "initial state of charge, in [0, 1]"),
    entry("T0", "298.0", "initial temperature (K)"),
    entry("R0", "0.03", "internal resistance (ohm)"),
    entry("sei0", "0.0", "initial SEI thickness"),
    entry("C_nom", "3.0", "nominal capacity (Ah)"),
    entry("dt", "0.1", "time step (s)"),
    entry("mass", "1.0", "thermal mass (kg)"),
    entry("specific_heat", "0.5", "specific heat (J/(kg K))"),
    entry("cooling_coefficient", "3.0", "Newtonian cooling coefficient (1/s)"),
    entry("T_ambient", "298.0", "ambient temperature (K)"),
    entry("thermal_cross_term", "off", "add I*(V_source - V)/(m c) to dT/dt"),
    entry("sei_model", "full", "SEI stress law: full or simplified"),
    entry("k0", "1e-7 (full) / 1e-12 (simplified)", "SEI rate prefactor (1/s)"),
    entry("Ea", "3.0e4", "SEI activation energy (J/mol)"),
    entry("sei_A", "1.0", "full SEI stress amplitude"),
    entry("sei_gamma", "0.5", "full SEI voltage sensitivity (1/V)"),
    entry("sei_beta", "0.1", "full SEI current sensitivity (1/A)"),
    entry("sei_nu", "1.0", "full SEI current exponent"),
    entry("sei_U_ref", "0.1", "full SEI reference potential (V)"),
    entry("transient", "off", "model the RC polarization branch"),
    entry("Rtr", "0.008", "RC branch resistance (ohm)"),
    entry("Ctr", "5000", "RC branch capacitance (F)"),
    entry("resistance_model", "constant", "internal resistance law: constant or arrhenius"),
    entry("Ea_R", "0.7", "resistance activation energy (J/mol)"),
    entry("T_ref", "298.0", "resistance reference temperature (K)"),
    entry("Vset", "4.2", "set-point voltage (V)"),
    entry("Iset", "20.0", "commanded current (A)"),
    entry("t_on", "2.0", "pulse on window (s)"),
    entry("t_off", "0.25", "pulse off window (s)"),
    entry("I_amp", "60.0", "sine current amplitude (A)"),
    entry("freq", "4.0", "sine frequency (Hz)"),
    entry("soc_threshold", "0.999", "SOC at which the run completes"),
    entry("t_max", "36000", "simulated-time cap (s)"),
    entry("max_steps", "1000000", "step cap"),
    entry("include_final_sample", "off", "append the threshold-crossing state"),
    entry("record_every", "1", "minimum sampling stride (steps)"),
    entry("max_points", "5000", "upper bound on trajectory samples"),
    entry("integrator", "rk4", "rk4 or euler"),
];

pub fn is_recognized(key: &str) -> bool {
    PARAMETER_KEYS.iter().any(|s| s.key == key)
}

/// Split `key=value` into a map entry.
pub fn parse_assignment(raw: &str) -> AppResult<(String, ParamValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::Config(format!("expected key=value, got '{raw}'")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::Config(format!("missing key in '{raw}'")));
    }
    Ok((key.to_string(), ParamValue::parse(value)))
}

/// Everything a run needs, resolved from a parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    pub policy: PolicySettings,
    pub cell: CellParams,
    pub initial: InitialConditions,
    pub options: SimOptions,
}

/// Typed access to a parameter map.
struct ParamReader<'a> {
    map: &'a ParameterMap,
}

impl ParamReader<'_> {
    fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn number(&self, key: &str, default: f64) -> AppResult<f64> {
        match self.map.get(key) {
            None => Ok(default),
            Some(ParamValue::Number(v)) => Ok(*v),
            Some(ParamValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::parameter(key, format!("expected a number, got '{s}'"))),
            Some(ParamValue::Bool(b)) => Err(AppError::parameter(
                key,
                format!("expected a number, got {b}"),
            )),
        }
    }

    fn count(&self, key: &str, default: usize) -> AppResult<usize> {
        if !self.contains(key) {
            return Ok(default);
        }
        let v = self.number(key, default as f64)?;
        if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
            return Err(AppError::parameter(
                key,
                format!("expected a non-negative integer, got {v}"),
            ));
        }
        Ok(v as usize)
    }

    fn flag(&self, key: &str, default: bool) -> AppResult<bool> {
        match self.map.get(key) {
            None => Ok(default),
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(ParamValue::Number(v)) => Ok(*v != 0.0),
            Some(ParamValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(true),
                "false" | "off" | "no" | "0" => Ok(false),
                other => Err(AppError::parameter(
                    key,
                    format!("expected on/off, got '{other}'"),
                )),
            },
        }
    }

    fn text(&self, key: &str, default: &str) -> AppResult<String> {
        match self.map.get(key) {
            None => Ok(default.to_string()),
            Some(ParamValue::Text(s)) => Ok(s.clone()),
            Some(ParamValue::Number(v)) => Err(AppError::parameter(
                key,
                format!("expected a name, got {v}"),
            )),
            Some(ParamValue::Bool(b)) => Err(AppError::parameter(
                key,
                format!("expected a name, got {b}"),
            )),
        }
    }
}

/// Resolve a parameter map into typed run inputs, applying defaults.
///
/// Only parses and fills defaults; range checks happen when the model and
/// options are built.
pub fn resolve(map: &ParameterMap, ocv: Option<OcvCurve>) -> AppResult<ResolvedParameters> {
    for key in map.keys().filter(|k| !is_recognized(k)) {
        warn!(key = %key, "ignoring unrecognized parameter");
    }
    let p = ParamReader { map };

    let base = PolicySettings::default();
    let policy = PolicySettings {
        v_set: p.number("Vset", base.v_set)?,
        i_set: p.number("Iset", base.i_set)?,
        t_on: p.number("t_on", base.t_on)?,
        t_off: p.number("t_off", base.t_off)?,
        i_amp: p.number("I_amp", base.i_amp)?,
        freq: p.number("freq", base.freq)?,
        pulse_cap: p.contains("Vset"),
    };

    let initial = InitialConditions {
        soc: p.number("soc0", defaults::SOC0)?,
        temperature: p.number("T0", defaults::T0)?,
        sei: p.number("sei0", defaults::SEI0)?,
    };

    let thermal_base = ThermalParams::default();
    let thermal = ThermalParams {
        mass: p.number("mass", thermal_base.mass)?,
        specific_heat: p.number("specific_heat", thermal_base.specific_heat)?,
        cooling_coefficient: p.number("cooling_coefficient", thermal_base.cooling_coefficient)?,
        t_ambient: p.number("T_ambient", thermal_base.t_ambient)?,
        cross_term: p.flag("thermal_cross_term", thermal_base.cross_term)?,
    };

    let sei_model = SeiModel::parse(&p.text("sei_model", SeiModel::default().as_str())?)?;
    let sei_base = SeiParams::for_model(sei_model);
    let stress_base = FullStress::default();
    let sei = SeiParams {
        model: sei_model,
        k0: p.number("k0", sei_base.k0)?,
        ea: p.number("Ea", sei_base.ea)?,
        stress: FullStress {
            a: p.number("sei_A", stress_base.a)?,
            gamma: p.number("sei_gamma", stress_base.gamma)?,
            beta: p.number("sei_beta", stress_base.beta)?,
            nu: p.number("sei_nu", stress_base.nu)?,
            u_ref: p.number("sei_U_ref", stress_base.u_ref)?,
        },
    };

    let rc_base = RcBranch::default();
    let transient = if p.flag("transient", false)? {
        Some(RcBranch {
            resistance: p.number("Rtr", rc_base.resistance)?,
            capacitance: p.number("Ctr", rc_base.capacitance)?,
        })
    } else {
        None
    };

    let resistance = ResistanceModel::parse(
        &p.text("resistance_model", "constant")?,
        p.number("Ea_R", ResistanceModel::DEFAULT_EA)?,
        p.number("T_ref", ResistanceModel::DEFAULT_T_REF)?,
    )?;

    let cell = CellParams {
        capacity_ah: p.number("C_nom", defaults::C_NOM)?,
        r0: p.number("R0", defaults::R0)?,
        resistance,
        thermal,
        sei,
        transient,
        ocv: ocv.unwrap_or_default(),
    };

    let opts_base = SimOptions::default();
    let options = SimOptions {
        dt: p.number("dt", opts_base.dt)?,
        t_max: p.number("t_max", opts_base.t_max)?,
        max_steps: p.count("max_steps", opts_base.max_steps)?,
        soc_threshold: p.number("soc_threshold", opts_base.soc_threshold)?,
        record_every: p.count("record_every", opts_base.record_every)?,
        max_points: p.count("max_points", opts_base.max_points)?,
        include_final_sample: p.flag("include_final_sample", opts_base.include_final_sample)?,
        integrator: IntegratorType::parse(&p.text("integrator", "rk4")?)?,
    };

    Ok(ResolvedParameters {
        policy,
        cell,
        initial,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, ParamValue)]) -> ParameterMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_map_gives_defaults() {
        let r = resolve(&ParameterMap::new(), None).unwrap();
        assert_eq!(r.cell, CellParams::default());
        assert_eq!(r.initial, InitialConditions::default());
        assert_eq!(r.options, SimOptions::default());
        assert_eq!(r.policy, PolicySettings::default());
        assert!(!r.policy.pulse_cap);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let r = resolve(&map(&[("Iset", "6".into()), ("dt", 0.05.into())]), None).unwrap();
        assert_eq!(r.policy.i_set, 6.0);
        assert_eq!(r.options.dt, 0.05);
    }

    #[test]
    fn non_numeric_value_names_key() {
        let err = resolve(&map(&[("R0", "abc".into())]), None).unwrap_err();
        assert_eq!(err.parameter_key(), Some("R0"));
    }

    #[test]
    fn fractional_step_cap_is_rejected() {
        let err = resolve(&map(&[("max_steps", 10.5.into())]), None).unwrap_err();
        assert_eq!(err.parameter_key(), Some("max_steps"));
    }

    #[test]
    fn flags_accept_words_and_numbers() {
        let r = resolve(
            &map(&[
                ("transient", "on".into()),
                ("thermal_cross_term", 1.0.into()),
                ("include_final_sample", "yes".into()),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(r.cell.transient, Some(RcBranch::default()));
        assert!(r.cell.thermal.cross_term);
        assert!(r.options.include_final_sample);

        let err = resolve(&map(&[("transient", "maybe".into())]), None).unwrap_err();
        assert_eq!(err.parameter_key(), Some("transient"));
    }

    #[test]
    fn sei_model_selects_default_k0() {
        let r = resolve(&map(&[("sei_model", "simplified".into())]), None).unwrap();
        assert_eq!(r.cell.sei.model, SeiModel::Simplified);
        assert_eq!(r.cell.sei.k0, 1e-12);

        let r = resolve(
            &map(&[("sei_model", "simplified".into()), ("k0", 2e-12.into())]),
            None,
        )
        .unwrap();
        assert_eq!(r.cell.sei.k0, 2e-12);

        let err = resolve(&map(&[("sei_model", 3.0.into())]), None).unwrap_err();
        assert_eq!(err.parameter_key(), Some("sei_model"));
    }

    #[test]
    fn explicit_vset_enables_pulse_cap() {
        let r = resolve(&map(&[("Vset", 3.9.into())]), None).unwrap();
        assert!(r.policy.pulse_cap);
        assert_eq!(r.policy.v_set, 3.9);
    }

    #[test]
    fn arrhenius_resistance_and_euler() {
        let r = resolve(
            &map(&[
                ("resistance_model", "arrhenius".into()),
                ("integrator", "euler".into()),
            ]),
            None,
        )
        .unwrap();
        assert!(matches!(r.cell.resistance, ResistanceModel::Arrhenius { .. }));
        assert_eq!(r.options.integrator, IntegratorType::ForwardEuler);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let r = resolve(&map(&[("colour", "blue".into())]), None).unwrap();
        assert_eq!(r.options, SimOptions::default());
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("Iset=6").unwrap(),
            ("Iset".to_string(), ParamValue::Number(6.0))
        );
        assert_eq!(
            parse_assignment("sei_model = full").unwrap(),
            ("sei_model".to_string(), ParamValue::Text("full".into()))
        );
        assert!(parse_assignment("Iset").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn every_key_is_documented_once() {
        let mut keys: Vec<_> = PARAMETER_KEYS.iter().map(|s| s.key).collect();
        let n = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), n);
    }

    #[test]
    fn boolean_switches_are_accepted() {
        let m: ParameterMap =
            serde_json::from_str(r#"{"include_final_sample": true, "transient": false}"#)
                .unwrap();
        assert_eq!(m["include_final_sample"], ParamValue::Bool(true));
        let r = resolve(&m, None).unwrap();
        assert!(r.options.include_final_sample);
        assert!(r.cell.transient.is_none());

        let m: ParameterMap =
            serde_yaml::from_str("transient: true\nthermal_cross_term: on\n").unwrap();
        let r = resolve(&m, None).unwrap();
        assert!(r.cell.transient.is_some());
        assert!(r.cell.thermal.cross_term);

        let err = resolve(&map(&[("Iset", true.into())]), None).unwrap_err();
        assert_eq!(err.parameter_key(), Some("Iset"));
    }

    #[test]
    fn initial_soc_out_of_range_names_key() {
        let err = crate::run_simulation("CC", &map(&[("soc0", (-3.0).into())])).unwrap_err();
        assert_eq!(err.parameter_key(), Some("soc0"));
        let err = crate::run_simulation("CC", &map(&[("soc0", 5.0.into())])).unwrap_err();
        assert_eq!(err.parameter_key(), Some("soc0"));
    }

    #[test]
    fn param_value_deserializes_untagged() {
        let m: ParameterMap = serde_json::from_str(r#"{"Iset": 6, "sei_model": "full"}"#).unwrap();
        assert_eq!(m["Iset"], ParamValue::Number(6.0));
        assert_eq!(m["sei_model"], ParamValue::Text("full".into()));
    }
}
