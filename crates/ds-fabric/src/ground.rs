//! Ground coupling for floor elements.
//!
//! Periodic heat transfer coefficients follow BS EN ISO 13370:2017 Annex H,
//! one pair (internal, external) per floor construction type. The steady
//! part of the coupling is handled by the ground element itself via its
//! virtual-layer conductance and monthly equivalent external temperature.

use ds_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{FabricError, FabricResult};
use crate::surface::R_SE;

/// Thermal conductivity of the ground, W/(m K). Clay/silt values.
pub const THERMAL_CONDUCTIVITY_OF_GROUND: Real = 1.5;
/// Heat capacity per volume of ground, J/(m^3 K).
pub const HEAT_CAPACITY_PER_VOLUME_OF_GROUND: Real = 3_000_000.0;
/// Periodic penetration depth of the ground, m.
pub const PERIODIC_PENETRATION_DEPTH: Real = 2.2;
/// Thickness of the modeled ground layer, m.
pub const THICKNESS_GROUND_LAYER: Real = 0.5;

/// Resistance of the modeled ground layer, (m^2 K)/W.
pub const R_GR_FOR_GROUND: Real = THICKNESS_GROUND_LAYER / THERMAL_CONDUCTIVITY_OF_GROUND;
/// Areal heat capacity of the modeled ground layer, J/(m^2 K).
pub const K_GR_FOR_GROUND: Real = THICKNESS_GROUND_LAYER * HEAT_CAPACITY_PER_VOLUME_OF_GROUND;

/// Internal surface resistance used for ground floors, (m^2 K)/W.
pub const R_SI_FOR_GROUND: Real = 0.17;

/// Assumed monthly mean internal temperatures over the ground floor, degC.
/// Averages over notional dwelling archetype runs.
pub const TEMP_INT_MONTHLY_FOR_GROUND: [Real; 12] = [
    19.46399546,
    19.66940204,
    19.90785898,
    20.19719837,
    20.37461865,
    20.45679018,
    20.46767703,
    20.46860812,
    20.43505593,
    20.22266322,
    19.82726777,
    19.45430847,
];

pub fn average_monthly_to_annual(monthly: [Real; 12]) -> Real {
    monthly.iter().sum::<Real>() / 12.0
}

/// Wind shielding of the site, for suspended floors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindShieldLocation {
    Sheltered,
    Average,
    Exposed,
}

/// Wind shielding factor, ISO 13370 Table 8.
pub fn wind_shield_fact(location: WindShieldLocation) -> Real {
    match location {
        WindShieldLocation::Sheltered => 0.02,
        WindShieldLocation::Average => 0.05,
        WindShieldLocation::Exposed => 0.10,
    }
}

/// Edge insulation applied at the slab perimeter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EdgeInsulation {
    Horizontal {
        /// Width of the insulation strip, m.
        width: Real,
        /// Thermal resistance of the strip, (m^2 K)/W.
        edge_thermal_resistance: Real,
    },
    Vertical {
        /// Depth the insulation reaches below ground, m.
        depth: Real,
        edge_thermal_resistance: Real,
    },
}

/// Floor construction type, carrying the parameters specific to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FloorData {
    SlabNoEdgeInsulation,
    SlabEdgeInsulation {
        edge_insulation: Vec<EdgeInsulation>,
    },
    SuspendedFloor {
        /// Height of the floor upper surface, m.
        height_upper_surface: Real,
        /// Thermal transmittance of walls above ground, W/(m^2 K).
        wall_transmittance: Real,
        /// Area of ventilation openings per perimeter, m^2/m.
        area_per_perimeter_vent: Real,
        shield_location: WindShieldLocation,
        /// Thermal resistance of insulation on the base of the underfloor
        /// space, (m^2 K)/W.
        insulation_resistance: Real,
    },
    HeatedBasement {
        /// Depth of the basement floor below ground level, m.
        depth_basement_floor: Real,
        /// Thermal resistance of the basement walls, (m^2 K)/W.
        basement_wall_resistance: Real,
    },
    UnheatedBasement {
        /// Thermal transmittance of the floor above the basement, W/(m^2 K).
        floor_above_transmittance: Real,
        /// Thermal transmittance of walls above ground, W/(m^2 K).
        wall_transmittance: Real,
        depth_basement_floor: Real,
        /// Height of the basement walls above ground level, m.
        height_basement_walls: Real,
    },
}

/// Equivalent thickness of the floor construction, m (ISO 13370 eqn 2).
pub fn total_equiv_thickness(d_we: Real, r_f: Real) -> Real {
    d_we + THERMAL_CONDUCTIVITY_OF_GROUND * (R_SI_FOR_GROUND + r_f + R_SE)
}

/// Internal and external periodic heat transfer coefficients (h_pi, h_pe)
/// for the floor, in W/K. `annual_wind_speed` is only consulted for
/// suspended floors.
pub fn periodic_coefficients(
    floor_data: &FloorData,
    total_area: Real,
    perimeter: Real,
    d_eq: Real,
    r_f: Real,
    d_we: Real,
    annual_wind_speed: Option<Real>,
) -> FabricResult<(Real, Real)> {
    match floor_data {
        FloorData::SlabNoEdgeInsulation => Ok(slab_uninsulated(total_area, d_eq, perimeter)),
        FloorData::SlabEdgeInsulation { edge_insulation } => {
            slab_edge_insulated(total_area, d_eq, perimeter, edge_insulation)
        }
        FloorData::SuspendedFloor {
            height_upper_surface,
            wall_transmittance,
            area_per_perimeter_vent,
            shield_location,
            insulation_resistance,
        } => {
            let wind = annual_wind_speed.ok_or(FabricError::AnnualWeatherUnavailable)?;
            Ok(suspended_floor(
                r_f,
                d_we,
                *insulation_resistance,
                total_area,
                perimeter,
                *height_upper_surface,
                *wall_transmittance,
                *area_per_perimeter_vent,
                *shield_location,
                wind,
            ))
        }
        FloorData::HeatedBasement {
            depth_basement_floor,
            basement_wall_resistance,
        } => Ok(heated_basement(
            total_area,
            *depth_basement_floor,
            perimeter,
            d_eq,
            *basement_wall_resistance,
        )),
        FloorData::UnheatedBasement {
            floor_above_transmittance,
            wall_transmittance,
            depth_basement_floor,
            height_basement_walls,
        } => Ok(unheated_basement(
            total_area,
            *height_basement_walls,
            *depth_basement_floor,
            *floor_above_transmittance,
            *wall_transmittance,
            perimeter,
            d_eq,
        )),
    }
}

// H.4.1/H.5.1 internal temperature variation
fn internal_temp_variation(total_area: Real, d_eq: Real) -> Real {
    total_area
        * (THERMAL_CONDUCTIVITY_OF_GROUND / d_eq)
        * (2.0 / ((1.0 + PERIODIC_PENETRATION_DEPTH / d_eq).powi(2) + 1.0)).powf(0.5)
}

/// Slab on ground, uninsulated or insulated all over.
fn slab_uninsulated(total_area: Real, d_eq: Real, perimeter: Real) -> (Real, Real) {
    let h_pi = internal_temp_variation(total_area, d_eq);

    // H.4.2; 0.37 is an unlabelled constant in the standard
    let h_pe = 0.37
        * perimeter
        * THERMAL_CONDUCTIVITY_OF_GROUND
        * (PERIODIC_PENETRATION_DEPTH / d_eq + 1.0).ln();

    (h_pi, h_pe)
}

/// Slab on ground with edge insulation. The most favourable (lowest) h_pe
/// over the provided edge insulation options is used.
fn slab_edge_insulated(
    total_area: Real,
    d_eq: Real,
    perimeter: Real,
    edge_insulation: &[EdgeInsulation],
) -> FabricResult<(Real, Real)> {
    let h_pi = internal_temp_variation(total_area, d_eq);

    let h_pe = edge_insulation
        .iter()
        .map(|edge| match *edge {
            EdgeInsulation::Horizontal {
                width,
                edge_thermal_resistance,
            } => h_pe_horizontal(width, edge_thermal_resistance, d_eq, perimeter),
            EdgeInsulation::Vertical {
                depth,
                edge_thermal_resistance,
            } => h_pe_vertical(depth, edge_thermal_resistance, d_eq, perimeter),
        })
        .min_by(|a, b| a.total_cmp(b))
        .ok_or(FabricError::MissingEdgeInsulation)?;

    Ok((h_pi, h_pe))
}

fn h_pe_horizontal(d_h: Real, r_n: Real, d_eq: Real, perimeter: Real) -> Real {
    let extra = additional_equiv_thickness(d_h, r_n);
    let decay = (-d_h / PERIODIC_PENETRATION_DEPTH).exp();

    0.37 * perimeter
        * THERMAL_CONDUCTIVITY_OF_GROUND
        * ((1.0 - decay) * (PERIODIC_PENETRATION_DEPTH / (d_eq + extra) + 1.0).ln()
            + decay * (PERIODIC_PENETRATION_DEPTH / d_eq + 1.0).ln())
}

fn h_pe_vertical(d_v: Real, r_n: Real, d_eq: Real, perimeter: Real) -> Real {
    let extra = additional_equiv_thickness(d_v, r_n);
    let decay = (-2.0 * d_v / PERIODIC_PENETRATION_DEPTH).exp();

    0.37 * perimeter
        * THERMAL_CONDUCTIVITY_OF_GROUND
        * ((1.0 - decay) * (PERIODIC_PENETRATION_DEPTH / (d_eq + extra) + 1.0).ln()
            + decay * (PERIODIC_PENETRATION_DEPTH / d_eq + 1.0).ln())
}

fn additional_equiv_thickness(d_n: Real, r_n: Real) -> Real {
    let r_add_eq = r_n - d_n / THERMAL_CONDUCTIVITY_OF_GROUND;
    r_add_eq * THERMAL_CONDUCTIVITY_OF_GROUND
}

/// Suspended floor over a ventilated underfloor space (H.6).
#[allow(clippy::too_many_arguments)]
fn suspended_floor(
    r_f: Real,
    d_we: Real,
    r_f_ins: Real,
    total_area: Real,
    perimeter: Real,
    h_upper: Real,
    u_w: Real,
    area_vent: Real,
    shield_location: WindShieldLocation,
    annual_wind_speed: Real,
) -> (Real, Real) {
    // thermal transmittance of the suspended part of the floor
    let u_f = 1.0 / (r_f + 2.0 * R_SI_FOR_GROUND);

    // equivalent thermal transmittance between underfloor space and outside;
    // 1450 is an unlabelled constant in the standard
    let char_dimen = total_area / (0.5 * perimeter);
    let u_x = 2.0 * (h_upper * u_w / char_dimen)
        + 1450.0 * (area_vent * annual_wind_speed * wind_shield_fact(shield_location)) / char_dimen;

    // equivalent thickness over the underfloor space
    let d_g = d_we + THERMAL_CONDUCTIVITY_OF_GROUND * (R_SI_FOR_GROUND + r_f_ins + R_SE);

    // H.6.2
    let h_pi = total_area
        * (1.0 / u_f
            + 1.0 / (THERMAL_CONDUCTIVITY_OF_GROUND / PERIODIC_PENETRATION_DEPTH + u_x));

    // H.6.3
    let h_pe = u_f
        * ((0.37
            * perimeter
            * THERMAL_CONDUCTIVITY_OF_GROUND
            * (PERIODIC_PENETRATION_DEPTH / d_g + 1.0).ln()
            + u_x * total_area)
            / (THERMAL_CONDUCTIVITY_OF_GROUND / (PERIODIC_PENETRATION_DEPTH + u_x + u_f)));

    (h_pi, h_pe)
}

/// Heated basement (H.7).
fn heated_basement(
    total_area: Real,
    z_b: Real,
    perimeter: Real,
    d_eq: Real,
    r_w_b: Real,
) -> (Real, Real) {
    // equivalent thickness of the basement walls
    let d_w_b = THERMAL_CONDUCTIVITY_OF_GROUND * (R_SI_FOR_GROUND + r_w_b + R_SE);

    // H.7.1
    let h_pi = total_area
        * ((THERMAL_CONDUCTIVITY_OF_GROUND / d_eq)
            * (2.0 / (1.0 + PERIODIC_PENETRATION_DEPTH / d_eq).powi(2) + 1.0).powf(0.5))
        + z_b
            * perimeter
            * (THERMAL_CONDUCTIVITY_OF_GROUND / d_w_b)
            * (2.0 / ((1.0 + PERIODIC_PENETRATION_DEPTH / d_w_b).powi(2) + 1.0)).powf(0.5);

    // H.7.2
    let decay = (-z_b / PERIODIC_PENETRATION_DEPTH).exp();
    let h_pe = 0.37
        * perimeter
        * THERMAL_CONDUCTIVITY_OF_GROUND
        * (decay * (PERIODIC_PENETRATION_DEPTH / d_eq + 1.0).ln()
            + 2.0 * (1.0 - decay) * (PERIODIC_PENETRATION_DEPTH / d_w_b + 1.0).ln());

    (h_pi, h_pe)
}

/// Unheated basement (H.8).
fn unheated_basement(
    total_area: Real,
    h_w: Real,
    z_b: Real,
    u_f_s: Real,
    u_w: Real,
    perimeter: Real,
    d_eq: Real,
) -> (Real, Real) {
    // Wh/(m^3 K)
    let thermal_capacity_air = 0.33;
    let air_vol_base = total_area * (h_w + z_b);

    // air changes per hour in the basement, ISO 13370 section 7.4
    let vent_rate_base = 0.3;

    let ground_coupling = (total_area + z_b * perimeter) * THERMAL_CONDUCTIVITY_OF_GROUND
        / PERIODIC_PENETRATION_DEPTH;
    let wall_loss = h_w * perimeter * u_w;
    let vent_loss = thermal_capacity_air * vent_rate_base * air_vol_base;

    // H.8.1
    let h_pi = (1.0 / (total_area * u_f_s)
        + 1.0 / (ground_coupling + wall_loss + vent_loss))
        .powi(-1);

    // H.8.2
    let h_pe = total_area
        * u_f_s
        * (0.37
            * perimeter
            * THERMAL_CONDUCTIVITY_OF_GROUND
            * (2.0 - (-z_b / PERIODIC_PENETRATION_DEPTH).exp())
            * (PERIODIC_PENETRATION_DEPTH / d_eq + 1.0).ln()
            + wall_loss
            + vent_loss)
        / (ground_coupling + wall_loss + vent_loss + total_area * u_f_s);

    (h_pi, h_pe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_coefficients_positive() {
        let d_eq = total_equiv_thickness(0.3, 1.1);
        let (h_pi, h_pe) = slab_uninsulated(20.0, d_eq, 18.0);
        assert!(h_pi > 0.0);
        assert!(h_pe > 0.0);
    }

    #[test]
    fn edge_insulation_lowers_external_coefficient() {
        let d_eq = total_equiv_thickness(0.3, 1.1);
        let (_, h_pe_plain) = slab_uninsulated(20.0, d_eq, 18.0);
        let (_, h_pe_edge) = slab_edge_insulated(
            20.0,
            d_eq,
            18.0,
            &[EdgeInsulation::Horizontal {
                width: 1.0,
                edge_thermal_resistance: 2.0,
            }],
        )
        .unwrap();
        assert!(h_pe_edge < h_pe_plain);
    }

    #[test]
    fn empty_edge_insulation_rejected() {
        let d_eq = total_equiv_thickness(0.3, 1.1);
        assert!(matches!(
            slab_edge_insulated(20.0, d_eq, 18.0, &[]),
            Err(FabricError::MissingEdgeInsulation)
        ));
    }

    #[test]
    fn suspended_floor_needs_annual_wind() {
        let floor = FloorData::SuspendedFloor {
            height_upper_surface: 0.5,
            wall_transmittance: 0.5,
            area_per_perimeter_vent: 0.01,
            shield_location: WindShieldLocation::Average,
            insulation_resistance: 0.7,
        };
        let d_eq = total_equiv_thickness(0.3, 1.1);
        assert!(matches!(
            periodic_coefficients(&floor, 20.0, 18.0, d_eq, 1.1, 0.3, None),
            Err(FabricError::AnnualWeatherUnavailable)
        ));
        assert!(periodic_coefficients(&floor, 20.0, 18.0, d_eq, 1.1, 0.3, Some(4.0)).is_ok());
    }

    #[test]
    fn sheltered_sites_shield_more_than_exposed() {
        assert!(
            wind_shield_fact(WindShieldLocation::Sheltered)
                < wind_shield_fact(WindShieldLocation::Exposed)
        );
    }
}
