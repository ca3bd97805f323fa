//! Surface heat-transfer coefficients and pitch conventions.
//!
//! Pitch is the tilt of the external surface from horizontal, in degrees:
//! 0 faces up, 90 is vertical, 180 faces down. Surfaces between the ceiling
//! and floor pitch limits are treated as vertical for surface-resistance
//! purposes; outside those limits the heat flow direction (and with it the
//! internal convective coefficient) depends on the air/surface temperature
//! difference.

use ds_core::Real;

/// Difference between external air temperature and sky temperature, K.
pub const TEMP_DIFF_SKY: Real = 11.0;

/// Internal convective coefficients by heat flow direction, W/(m^2 K).
pub const H_CI_UPWARDS: Real = 5.0;
pub const H_CI_HORIZONTAL: Real = 2.5;
pub const H_CI_DOWNWARDS: Real = 0.7;

/// External convective coefficient, W/(m^2 K).
pub const H_CE: Real = 20.0;

/// Internal and external radiative coefficients, W/(m^2 K).
pub const H_RI: Real = 5.13;
pub const H_RE: Real = 4.14;

/// Surface resistances derived from the coefficients above, (m^2 K)/W.
pub const R_SI_HORIZONTAL: Real = 1.0 / (H_RI + H_CI_HORIZONTAL);
pub const R_SI_UPWARDS: Real = 1.0 / (H_RI + H_CI_UPWARDS);
pub const R_SI_DOWNWARDS: Real = 1.0 / (H_RI + H_CI_DOWNWARDS);
pub const R_SE: Real = 1.0 / (H_CE + H_RE);

/// Pitch band limits, degrees. Anything in between counts as vertical.
pub const PITCH_LIMIT_HORIZ_CEILING: Real = 60.0;
pub const PITCH_LIMIT_HORIZ_FLOOR: Real = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatFlowDirection {
    Horizontal,
    Upwards,
    Downwards,
}

/// Direction of heat flow through a surface given its pitch and the current
/// internal air and surface temperatures. Near-vertical surfaces always
/// report horizontal flow regardless of the temperatures.
pub fn heat_flow_direction(
    pitch: Real,
    temp_int_air: Real,
    temp_int_surface: Real,
) -> HeatFlowDirection {
    if (PITCH_LIMIT_HORIZ_CEILING..=PITCH_LIMIT_HORIZ_FLOOR).contains(&pitch) {
        return HeatFlowDirection::Horizontal;
    }
    let inwards = temp_int_air < temp_int_surface;
    let is_floor = pitch > PITCH_LIMIT_HORIZ_FLOOR;
    let is_ceiling = pitch < PITCH_LIMIT_HORIZ_CEILING;
    if (is_floor && inwards) || (is_ceiling && !inwards) {
        HeatFlowDirection::Upwards
    } else {
        HeatFlowDirection::Downwards
    }
}

/// Internal convective coefficient for the given flow direction, W/(m^2 K).
pub fn h_ci_for(direction: HeatFlowDirection) -> Real {
    match direction {
        HeatFlowDirection::Horizontal => H_CI_HORIZONTAL,
        HeatFlowDirection::Upwards => H_CI_UPWARDS,
        HeatFlowDirection::Downwards => H_CI_DOWNWARDS,
    }
}

/// Internal surface resistance for a pitch, (m^2 K)/W.
pub fn r_si_for_pitch(pitch: Real) -> Real {
    if (PITCH_LIMIT_HORIZ_CEILING..=PITCH_LIMIT_HORIZ_FLOOR).contains(&pitch) {
        R_SI_HORIZONTAL
    } else if pitch < PITCH_LIMIT_HORIZ_CEILING {
        R_SI_UPWARDS
    } else {
        R_SI_DOWNWARDS
    }
}

/// Longwave sky view factor from pitch in degrees.
pub fn sky_view_factor(pitch: Real) -> Real {
    0.5 * (1.0 + pitch.to_radians().cos())
}

/// Longwave radiative loss coefficient to the sky, W/m^2.
pub fn therm_rad_to_sky(f_sky: Real) -> Real {
    f_sky * H_RE * TEMP_DIFF_SKY
}

/// Vertically projected height of a surface. Floored at 0.01 m so shading
/// geometry stays valid for horizontal surfaces.
pub fn projected_height(pitch: Real, height: Real) -> Real {
    let ph = height * pitch.to_radians().sin();
    ph.max(0.01)
}

/// Resistance of the construction alone, from a u-value that includes the
/// surface resistances on both sides.
pub fn convert_uvalue_to_resistance(u_value: Real, pitch: Real) -> Real {
    (1.0 / u_value) - r_si_for_pitch(pitch) - R_SE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_pitch_is_always_horizontal_flow() {
        for (air, surface) in [(20.0, 10.0), (10.0, 20.0), (15.0, 15.0)] {
            assert_eq!(
                heat_flow_direction(90.0, air, surface),
                HeatFlowDirection::Horizontal
            );
        }
        // band edges included
        assert_eq!(
            heat_flow_direction(60.0, 20.0, 10.0),
            HeatFlowDirection::Horizontal
        );
        assert_eq!(
            heat_flow_direction(120.0, 20.0, 10.0),
            HeatFlowDirection::Horizontal
        );
    }

    #[test]
    fn ceiling_flow_follows_temperature_difference() {
        // warm air under a cold ceiling: outwards, so upwards
        assert_eq!(
            heat_flow_direction(0.0, 21.0, 15.0),
            HeatFlowDirection::Upwards
        );
        // cold air under a warm ceiling: inwards, so downwards
        assert_eq!(
            heat_flow_direction(0.0, 15.0, 21.0),
            HeatFlowDirection::Downwards
        );
    }

    #[test]
    fn floor_flow_follows_temperature_difference() {
        assert_eq!(
            heat_flow_direction(180.0, 15.0, 21.0),
            HeatFlowDirection::Upwards
        );
        assert_eq!(
            heat_flow_direction(180.0, 21.0, 15.0),
            HeatFlowDirection::Downwards
        );
    }

    #[test]
    fn sky_view_factor_bounds() {
        assert!((sky_view_factor(0.0) - 1.0).abs() < 1e-12);
        assert!((sky_view_factor(90.0) - 0.5).abs() < 1e-12);
        assert!(sky_view_factor(180.0).abs() < 1e-12);
    }

    #[test]
    fn projected_height_floors_at_one_centimetre() {
        assert!((projected_height(90.0, 2.5) - 2.5).abs() < 1e-12);
        assert_eq!(projected_height(0.0, 2.5), 0.01);
    }

    #[test]
    fn uvalue_resistance_round_trip() {
        let r_c = convert_uvalue_to_resistance(1.8, 90.0);
        let u = 1.0 / (r_c + R_SI_HORIZONTAL + R_SE);
        assert!((u - 1.8).abs() < 1e-12);
    }
}
