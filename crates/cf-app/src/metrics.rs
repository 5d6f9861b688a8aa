//! Charge performance metrics.
//!
//! Computes summary figures (charging time, temperature, SEI growth, charge
//! throughput, thermal stress) from a finished simulation result.

use cf_core::{amp_hours, as_amp_hours, as_celsius, as_hours, coulombs, k, s, trapezoid};
use serde::{Deserialize, Serialize};

use crate::run_service::SimulationResult;

/// Summary of one charge run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChargeMetrics {
    /// Time to reach the SOC threshold (seconds); `None` unless completed
    pub charging_time_s: Option<f64>,
    /// Same, in hours
    pub charging_time_h: Option<f64>,
    /// Peak sampled temperature (K)
    pub peak_temperature_k: Option<f64>,
    pub peak_temperature_c: Option<f64>,
    /// Mean sampled temperature (K)
    pub avg_temperature_k: Option<f64>,
    pub avg_temperature_c: Option<f64>,
    pub final_soc: Option<f64>,
    pub final_sei: Option<f64>,
    /// Last sampled SEI minus first
    pub sei_growth: Option<f64>,
    /// Trapezoidal integral of |I| dt (Ah)
    pub charge_throughput_ah: Option<f64>,
    /// Trapezoidal integral of (T - T_ambient) dt (K·s)
    pub thermal_stress: Option<f64>,
}

impl ChargeMetrics {
    /// Returns true if at least some metrics were computed
    pub fn has_data(&self) -> bool {
        self.peak_temperature_k.is_some() || self.charging_time_s.is_some()
    }
}

/// Compute metrics for a run; thermal stress is measured against the run's ambient.
pub fn compute_charge_metrics(result: &SimulationResult) -> ChargeMetrics {
    let tr = &result.trajectory;
    let t_ambient = result.t_ambient;
    let mut metrics = ChargeMetrics::default();

    if result.status.is_completed() {
        metrics.charging_time_s = Some(result.final_time);
        metrics.charging_time_h = Some(as_hours(s(result.final_time)));
    }

    if tr.is_empty() {
        return metrics;
    }

    let peak = tr
        .temperature
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let avg = tr.temperature.iter().sum::<f64>() / tr.len() as f64;
    metrics.peak_temperature_k = Some(peak);
    metrics.peak_temperature_c = Some(as_celsius(k(peak)));
    metrics.avg_temperature_k = Some(avg);
    metrics.avg_temperature_c = Some(as_celsius(k(avg)));

    metrics.final_soc = tr.last_soc();
    if let (Some(first), Some(last)) = (tr.sei.first(), tr.sei.last()) {
        metrics.final_sei = Some(*last);
        metrics.sei_growth = Some(last - first);
    }

    let abs_current: Vec<f64> = tr.current.iter().map(|i| i.abs()).collect();
    let throughput = coulombs(trapezoid(&tr.time, &abs_current));
    metrics.charge_throughput_ah = Some(as_amp_hours(throughput));

    let excess: Vec<f64> = tr.temperature.iter().map(|t| t - t_ambient).collect();
    metrics.thermal_stress = Some(trapezoid(&tr.time, &excess));

    metrics
}

/// Charge delivered from sample `from_index` to the last, as a fraction of capacity.
///
/// Compared against the SOC change this checks charge conservation along a
/// trajectory.
pub fn delivered_soc(result: &SimulationResult, capacity_ah: f64, from_index: usize) -> f64 {
    let tr = &result.trajectory;
    if from_index >= tr.len() {
        return 0.0;
    }
    let q = trapezoid(&tr.time[from_index..], &tr.current[from_index..]);
    q / amp_hours(capacity_ah).value
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_cell::PolicyId;
    use cf_core::{Tolerances, nearly_equal};
    use cf_sim::{SimStatus, Trajectory};

    fn result(
        status: SimStatus,
        time: Vec<f64>,
        current: Vec<f64>,
        temperature: Vec<f64>,
    ) -> SimulationResult {
        let n = time.len();
        SimulationResult {
            status,
            policy: PolicyId::Cc,
            policy_label: "CC_3A".into(),
            policy_fallback: None,
            steps: n,
            final_time: time.last().copied().unwrap_or(0.0) + 1.0,
            t_ambient: 298.0,
            trajectory: Trajectory {
                time,
                voltage: vec![3.3; n],
                current,
                resistance: vec![0.03; n],
                temperature,
                soc: (0..n).map(|i| i as f64 * 0.1).collect(),
                sei: (0..n).map(|i| i as f64 * 1e-9).collect(),
                transient: None,
            },
            diagnostic: None,
        }
    }

    #[test]
    fn metrics_from_simple_trajectory() {
        let r = result(
            SimStatus::Completed,
            vec![0.0, 1800.0, 3600.0],
            vec![3.0, 3.0, 3.0],
            vec![298.0, 300.0, 302.0],
        );
        let m = compute_charge_metrics(&r);
        assert_eq!(m.charging_time_s, Some(3601.0));
        assert!((m.charging_time_h.unwrap() - 3601.0 / 3600.0).abs() < 1e-12);
        assert_eq!(m.peak_temperature_k, Some(302.0));
        assert!((m.peak_temperature_c.unwrap() - 28.85).abs() < 1e-9);
        assert_eq!(m.avg_temperature_k, Some(300.0));
        assert!(nearly_equal(
            m.charge_throughput_ah.unwrap(),
            3.0,
            Tolerances::default()
        ));
        // Triangle of height 4 K over 3600 s
        assert!((m.thermal_stress.unwrap() - 7200.0).abs() < 1e-9);
        assert!((m.sei_growth.unwrap() - 2e-9).abs() < 1e-20);
        assert!(m.has_data());
    }

    #[test]
    fn charging_time_only_for_completed_runs() {
        let r = result(
            SimStatus::NonConverged,
            vec![0.0, 1.0],
            vec![0.0, 0.0],
            vec![298.0, 298.0],
        );
        let m = compute_charge_metrics(&r);
        assert!(m.charging_time_s.is_none());
        assert_eq!(m.thermal_stress, Some(0.0));
    }

    #[test]
    fn empty_trajectory_has_no_sample_metrics() {
        let r = result(SimStatus::Completed, vec![], vec![], vec![]);
        let m = compute_charge_metrics(&r);
        assert!(m.peak_temperature_k.is_none());
        assert!(m.charging_time_s.is_some());
    }

    #[test]
    fn delivered_soc_from_constant_current() {
        let r = result(
            SimStatus::Completed,
            vec![0.0, 1800.0, 3600.0],
            vec![0.0, 3.0, 3.0],
            vec![298.0; 3],
        );
        // One hour at 3 A into a 3 Ah cell, counting from the second sample
        assert!((delivered_soc(&r, 3.0, 1) - 0.5).abs() < 1e-12);
        assert_eq!(delivered_soc(&r, 3.0, 5), 0.0);
    }
}
