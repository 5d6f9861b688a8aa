//! Open-circuit voltage curve.
//!
//! The cell voltage at zero current is a fixed function of SOC, tabulated as
//! `(soc, volts)` breakpoints and linearly interpolated in between.

use crate::error::{CellError, CellResult};

/// LiFePO4 single-cell curve (nominal 3.2 V), sorted by descending SOC.
pub const LFP_OCV_TABLE: [(f64, f64); 16] = [
    (1.000, 3.65),
    (0.995, 3.45),
    (0.990, 3.38),
    (0.900, 3.35),
    (0.800, 3.33),
    (0.700, 3.30),
    (0.600, 3.28),
    (0.500, 3.26),
    (0.400, 3.25),
    (0.300, 3.23),
    (0.200, 3.20),
    (0.150, 3.05),
    (0.095, 3.00),
    (0.050, 2.80),
    (0.005, 2.54),
    (0.000, 2.50),
];

/// Piecewise-linear OCV(SOC) lookup.
///
/// Breakpoints are stored by descending SOC and always span `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OcvCurve {
    points: Vec<(f64, f64)>,
}

impl OcvCurve {
    /// The default LiFePO4 curve.
    pub fn lfp() -> Self {
        Self {
            points: LFP_OCV_TABLE.to_vec(),
        }
    }

    /// Build a curve from `(soc, volts)` breakpoints.
    ///
    /// Breakpoints must be finite, strictly descending in SOC, start at SOC 1,
    /// end at SOC 0, and have voltages that never rise as SOC falls.
    pub fn new(points: Vec<(f64, f64)>) -> CellResult<Self> {
        if points.len() < 2 {
            return Err(CellError::InvalidCurve {
                what: "at least two breakpoints are required",
            });
        }
        if points
            .iter()
            .any(|(soc, v)| !soc.is_finite() || !v.is_finite())
        {
            return Err(CellError::InvalidCurve {
                what: "breakpoints must be finite",
            });
        }
        let (first_soc, _) = points[0];
        let (last_soc, _) = points[points.len() - 1];
        if first_soc != 1.0 || last_soc != 0.0 {
            return Err(CellError::InvalidCurve {
                what: "breakpoints must cover SOC 1 down to SOC 0",
            });
        }
        for pair in points.windows(2) {
            let (soc_hi, v_hi) = pair[0];
            let (soc_lo, v_lo) = pair[1];
            if soc_lo >= soc_hi {
                return Err(CellError::InvalidCurve {
                    what: "SOC must be strictly descending",
                });
            }
            if v_lo > v_hi {
                return Err(CellError::InvalidCurve {
                    what: "voltage must be non-decreasing in SOC",
                });
            }
        }
        Ok(Self { points })
    }

    /// Open-circuit voltage at `soc`. Input is clamped to `[0, 1]`.
    pub fn voltage(&self, soc: f64) -> f64 {
        let soc = soc.clamp(0.0, 1.0);
        for pair in self.points.windows(2) {
            let (soc_hi, v_hi) = pair[0];
            let (soc_lo, v_lo) = pair[1];
            if soc_lo <= soc && soc <= soc_hi {
                let fraction = (soc - soc_lo) / (soc_hi - soc_lo);
                return v_lo + fraction * (v_hi - v_lo);
            }
        }
        // No bracket (NaN input): fall back to the last entry.
        self.points[self.points.len() - 1].1
    }

    /// Voltage at SOC 0.
    pub fn min_voltage(&self) -> f64 {
        self.points[self.points.len() - 1].1
    }

    /// Voltage at SOC 1.
    pub fn max_voltage(&self) -> f64 {
        self.points[0].1
    }
}

impl Default for OcvCurve {
    fn default() -> Self {
        Self::lfp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_table_extremes() {
        let curve = OcvCurve::lfp();
        assert_eq!(curve.voltage(0.0), 2.50);
        assert_eq!(curve.voltage(1.0), 3.65);
        assert_eq!(curve.min_voltage(), 2.50);
        assert_eq!(curve.max_voltage(), 3.65);
    }

    #[test]
    fn interpolates_between_breakpoints() {
        let curve = OcvCurve::lfp();
        // Halfway between (0.5, 3.26) and (0.6, 3.28)
        assert!((curve.voltage(0.55) - 3.27).abs() < 1e-12);
        // Exactly on a breakpoint
        assert!((curve.voltage(0.8) - 3.33).abs() < 1e-12);
    }

    #[test]
    fn input_is_clamped() {
        let curve = OcvCurve::lfp();
        assert_eq!(curve.voltage(-0.3), 2.50);
        assert_eq!(curve.voltage(1.7), 3.65);
    }

    #[test]
    fn nan_falls_back_to_last_entry() {
        let curve = OcvCurve::lfp();
        assert_eq!(curve.voltage(f64::NAN), 2.50);
    }

    #[test]
    fn custom_curve_validation() {
        assert!(OcvCurve::new(vec![(1.0, 4.2), (0.0, 3.0)]).is_ok());
        assert!(OcvCurve::new(vec![(1.0, 4.2)]).is_err());
        assert!(OcvCurve::new(vec![(0.9, 4.2), (0.0, 3.0)]).is_err());
        assert!(OcvCurve::new(vec![(1.0, 4.2), (0.5, 3.5), (0.5, 3.4), (0.0, 3.0)]).is_err());
        assert!(OcvCurve::new(vec![(1.0, 3.0), (0.0, 4.2)]).is_err());
        assert!(OcvCurve::new(vec![(1.0, f64::NAN), (0.0, 3.0)]).is_err());
    }

    #[test]
    fn custom_curve_interpolates() {
        let curve = OcvCurve::new(vec![(1.0, 4.2), (0.0, 3.0)]).unwrap();
        assert!((curve.voltage(0.5) - 3.6).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ocv_is_non_decreasing(a in -0.2_f64..1.2, b in -0.2_f64..1.2) {
            let curve = OcvCurve::lfp();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(curve.voltage(lo) <= curve.voltage(hi) + 1e-12);
        }

        #[test]
        fn ocv_stays_within_table_range(soc in -1.0_f64..2.0) {
            let curve = OcvCurve::lfp();
            let v = curve.voltage(soc);
            prop_assert!(v >= curve.min_voltage() && v <= curve.max_voltage());
        }
    }
}
