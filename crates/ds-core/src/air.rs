//! Reference air properties and the density corrections used when converting
//! between volume and mass flow bases.
//!
//! Reference state follows BS EN 16798-7: dry air at 20 C and sea-level
//! standard pressure.

use crate::numeric::Real;

/// Reference external air temperature, K.
pub const T_E_REF: Real = 293.15;
/// Absolute zero offset, K.
pub const T_0_ABS: Real = 273.15;
/// Air density at the reference state, kg/m^3.
pub const RHO_A_REF: Real = 1.204;
/// Reference atmospheric pressure, Pa.
pub const P_A_REF: Real = 101_325.0;
/// Specific heat capacity of air, J/(kg K).
pub const C_A: Real = 1_006.0;
/// Gravitational acceleration, m/s^2.
pub const G: Real = 9.81;

#[inline]
pub fn celsius_to_kelvin(t_c: Real) -> Real {
    t_c + T_0_ABS
}

/// Reference air density corrected for site altitude, kg/m^3.
///
/// Barometric formula fit used by the ventilation standard; valid for
/// dwelling altitudes (well below the 11 km troposphere limit).
pub fn air_density_at_altitude(h_alt_m: Real) -> Real {
    RHO_A_REF * (1.0 - 0.00651 * h_alt_m / 293.0).powf(4.255)
}

/// Air density at an actual temperature, starting from the altitude-corrected
/// reference density, kg/m^3.
pub fn air_density_at_temp(t_k: Real, rho_alt: Real) -> Real {
    T_E_REF / t_k * rho_alt
}

/// Volume flow (m^3/h) to mass flow (kg/h) at the given air temperature.
pub fn volume_to_mass_flow(qv_m3h: Real, t_k: Real, rho_alt: Real) -> Real {
    qv_m3h * air_density_at_temp(t_k, rho_alt)
}

/// Mass flow (kg/h) to volume flow (m^3/h) at the given air temperature.
pub fn mass_to_volume_flow(qm_kgh: Real, t_k: Real, rho_alt: Real) -> Real {
    qm_kgh / air_density_at_temp(t_k, rho_alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_density_is_reference() {
        assert!((air_density_at_altitude(0.0) - RHO_A_REF).abs() < 1e-12);
    }

    #[test]
    fn density_falls_with_altitude() {
        assert!(air_density_at_altitude(500.0) < RHO_A_REF);
        assert!(air_density_at_altitude(1500.0) < air_density_at_altitude(500.0));
    }

    #[test]
    fn density_falls_with_temperature() {
        let rho_cold = air_density_at_temp(celsius_to_kelvin(0.0), RHO_A_REF);
        let rho_warm = air_density_at_temp(celsius_to_kelvin(25.0), RHO_A_REF);
        assert!(rho_cold > rho_warm);
    }

    #[test]
    fn flow_conversions_round_trip() {
        let t_k = celsius_to_kelvin(12.0);
        let qv = 123.4;
        let qm = volume_to_mass_flow(qv, t_k, RHO_A_REF);
        let back = mass_to_volume_flow(qm, t_k, RHO_A_REF);
        assert!((back - qv).abs() < 1e-9);
    }
}
