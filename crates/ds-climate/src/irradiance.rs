//! Anisotropic sky model per BS EN ISO 52010-1 (Perez).
//!
//! Diffuse irradiance on a tilted surface is split into an isotropic sky
//! part, a circumsolar part and a horizon-brightening part, weighted by the
//! brightness coefficients F1/F2 looked up from the clearness-binned table.

use ds_core::Real;

const CLEARNESS_FORMULA_K: Real = 1.014;

/// Clearness value used when there is no diffuse radiation at all.
pub const CLEARNESS_OVERCAST_SENTINEL: Real = 999.0;

struct BrightnessCoefficientsRow {
    f11: Real,
    f12: Real,
    f13: Real,
    f21: Real,
    f22: Real,
    f23: Real,
}

// Table 8 in ISO 52010, one row per clearness bin
static BRIGHTNESS_COEFFICIENTS: [BrightnessCoefficientsRow; 8] = [
    BrightnessCoefficientsRow {
        f11: -0.008,
        f12: 0.588,
        f13: -0.062,
        f21: -0.06,
        f22: 0.072,
        f23: -0.022,
    },
    BrightnessCoefficientsRow {
        f11: 0.13,
        f12: 0.683,
        f13: -0.151,
        f21: -0.019,
        f22: 0.066,
        f23: -0.029,
    },
    BrightnessCoefficientsRow {
        f11: 0.33,
        f12: 0.487,
        f13: -0.221,
        f21: 0.055,
        f22: -0.064,
        f23: -0.026,
    },
    BrightnessCoefficientsRow {
        f11: 0.568,
        f12: 0.187,
        f13: -0.295,
        f21: 0.109,
        f22: -0.152,
        f23: -0.014,
    },
    BrightnessCoefficientsRow {
        f11: 0.873,
        f12: -0.392,
        f13: -0.362,
        f21: 0.226,
        f22: -0.462,
        f23: 0.001,
    },
    BrightnessCoefficientsRow {
        f11: 1.132,
        f12: -1.237,
        f13: -0.412,
        f21: 0.288,
        f22: -0.823,
        f23: 0.056,
    },
    BrightnessCoefficientsRow {
        f11: 1.06,
        f12: -1.6,
        f13: -0.359,
        f21: 0.264,
        f22: -1.127,
        f23: 0.131,
    },
    BrightnessCoefficientsRow {
        f11: 0.678,
        f12: -0.327,
        f13: -0.25,
        f21: 0.156,
        f22: -1.377,
        f23: 0.251,
    },
];

fn brightness_row(e: Real) -> &'static BrightnessCoefficientsRow {
    &BRIGHTNESS_COEFFICIENTS[if e < 1.065 {
        0
    } else if e < 1.23 {
        1
    } else if e < 1.5 {
        2
    } else if e < 1.95 {
        3
    } else if e < 2.8 {
        4
    } else if e < 4.5 {
        5
    } else if e < 6.2 {
        6
    } else {
        7
    }]
}

/// Dimensionless clearness parameter E for the timestep.
pub fn clearness_parameter(
    diffuse_horizontal: Real,
    direct_beam: Real,
    solar_altitude: Real,
) -> Real {
    if diffuse_horizontal == 0.0 {
        return CLEARNESS_OVERCAST_SENTINEL;
    }
    let alt_term = CLEARNESS_FORMULA_K * solar_altitude.to_radians().powi(3);
    (((diffuse_horizontal + direct_beam) / diffuse_horizontal) + alt_term) / (1.0 + alt_term)
}

/// Dimensionless sky brightness parameter, delta.
pub fn sky_brightness_parameter(
    air_mass: Real,
    diffuse_horizontal: Real,
    extra_terrestrial: Real,
) -> Real {
    air_mass * diffuse_horizontal / extra_terrestrial
}

/// Circumsolar brightness coefficient F1 (clamped non-negative).
pub fn f1_circumsolar(e: Real, delta: Real, solar_zenith_angle: Real) -> Real {
    let row = brightness_row(e);
    let f1 = row.f11 + row.f12 * delta + row.f13 * solar_zenith_angle.to_radians();
    f1.max(0.0)
}

/// Horizon brightness coefficient F2.
pub fn f2_horizontal(e: Real, delta: Real, solar_zenith_angle: Real) -> Real {
    let row = brightness_row(e);
    row.f21 + row.f22 * delta + row.f23 * solar_zenith_angle.to_radians()
}

/// Convert direct horizontal beam values from climate data to normal
/// incidence, if the data set requires it (ISO 52010 section 6.4.2).
pub fn direct_beam_to_normal_incidence(
    conversion_needed: bool,
    raw_value: Real,
    solar_altitude: Real,
) -> Real {
    if conversion_needed {
        let sin_asol = solar_altitude.to_radians().sin();
        if sin_asol > 0.0 { raw_value / sin_asol } else { raw_value }
    } else {
        raw_value
    }
}
