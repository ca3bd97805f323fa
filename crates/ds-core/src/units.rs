// ds-core/src/units.rs

use uom::si::f64::{Energy as UomEnergy, Power as UomPower};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Power = UomPower;

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn kwh(v: f64) -> Energy {
    use uom::si::energy::kilowatt_hour;
    Energy::new::<kilowatt_hour>(v)
}

/// Plain-f64 conversions used on hot paths where carrying uom types through
/// the solver would obscure the arithmetic.
pub mod convert {
    /// Average power in W over a timestep of `hours` to energy in kWh.
    #[inline]
    pub fn watts_to_kwh(power_w: f64, hours: f64) -> f64 {
        power_w * hours / 1000.0
    }

    /// Energy in kWh delivered over a timestep of `hours` to average power in W.
    #[inline]
    pub fn kwh_to_watts(energy_kwh: f64, hours: f64) -> f64 {
        energy_kwh * 1000.0 / hours
    }
}
