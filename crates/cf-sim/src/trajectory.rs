//! Sampled run output.

use serde::{Deserialize, Serialize};

use crate::cell_model::{DerivedState, IntegratedState};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimStatus {
    /// SOC reached the completion threshold.
    Completed,
    /// The step or time cap was hit first.
    NonConverged,
    /// A state component became non-finite or non-physical.
    NumericDivergence,
}

impl SimStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, SimStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimStatus::Completed => "completed",
            SimStatus::NonConverged => "non_converged",
            SimStatus::NumericDivergence => "numeric_divergence",
        }
    }
}

impl std::fmt::Display for SimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parallel, equal-length sample columns. `time` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub time: Vec<f64>,
    pub voltage: Vec<f64>,
    pub current: Vec<f64>,
    pub resistance: Vec<f64>,
    pub temperature: Vec<f64>,
    pub soc: Vec<f64>,
    pub sei: Vec<f64>,
    /// Present only when the RC branch is modelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient: Option<Vec<f64>>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize, with_transient: bool) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            voltage: Vec::with_capacity(capacity),
            current: Vec::with_capacity(capacity),
            resistance: Vec::with_capacity(capacity),
            temperature: Vec::with_capacity(capacity),
            soc: Vec::with_capacity(capacity),
            sei: Vec::with_capacity(capacity),
            transient: with_transient.then(|| Vec::with_capacity(capacity)),
        }
    }

    pub(crate) fn push(&mut self, t: f64, x: &IntegratedState, d: &DerivedState) {
        self.time.push(t);
        self.voltage.push(d.voltage);
        self.current.push(d.current);
        self.resistance.push(d.resistance);
        self.temperature.push(x.temperature);
        self.soc.push(x.soc);
        self.sei.push(x.sei);
        if let Some(vc) = self.transient.as_mut() {
            vc.push(x.transient);
        }
    }

    /// Keep every other sample, starting with the first.
    pub(crate) fn decimate(&mut self) {
        for column in [
            &mut self.time,
            &mut self.voltage,
            &mut self.current,
            &mut self.resistance,
            &mut self.temperature,
            &mut self.soc,
            &mut self.sei,
        ] {
            keep_even(column);
        }
        if let Some(vc) = self.transient.as_mut() {
            keep_even(vc);
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    pub fn last_soc(&self) -> Option<f64> {
        self.soc.last().copied()
    }
}

fn keep_even(column: &mut Vec<f64>) {
    let mut index = 0usize;
    column.retain(|_| {
        let keep = index % 2 == 0;
        index += 1;
        keep
    });
}
