// cf-core/src/units.rs

use uom::si::f64::{
    ElectricCharge as UomElectricCharge, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Charge = UomElectricCharge;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn coulombs(v: f64) -> Charge {
    use uom::si::electric_charge::coulomb;
    Charge::new::<coulomb>(v)
}

#[inline]
pub fn amp_hours(v: f64) -> Charge {
    use uom::si::electric_charge::ampere_hour;
    Charge::new::<ampere_hour>(v)
}

#[inline]
pub fn as_hours(t: Time) -> f64 {
    use uom::si::time::hour;
    t.get::<hour>()
}

#[inline]
pub fn as_celsius(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn as_amp_hours(q: Charge) -> f64 {
    use uom::si::electric_charge::ampere_hour;
    q.get::<ampere_hour>()
}

pub mod constants {
    /// Universal gas constant [J/(mol·K)]
    pub const R_GAS: f64 = 8.314;

    /// Seconds per hour, used to turn Ah capacity into A·s.
    pub const SECONDS_PER_HOUR: f64 = 3600.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _t = k(298.0);
        let _dt = s(0.1);
        let _q = coulombs(3600.0);
    }

    #[test]
    fn conversions() {
        assert!((as_hours(s(5400.0)) - 1.5).abs() < 1e-12);
        assert!((as_celsius(k(298.15)) - 25.0).abs() < 1e-9);
        assert!((as_amp_hours(coulombs(7200.0)) - 2.0).abs() < 1e-12);
        assert!((as_amp_hours(amp_hours(3.0)) - 3.0).abs() < 1e-12);
    }
}
