//! Wind exposure: terrain correction and facade pressure coefficients.
//!
//! Pressure coefficients come from the BS EN 16798-7 Table B.7 family,
//! keyed by cross-ventilation potential, shielding, path height and facade
//! direction relative to the wind. Combinations outside the published table
//! return `None`; the network rejects them at configuration time.

use ds_core::Real;
use serde::{Deserialize, Serialize};

/// Terrain class around the site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainClass {
    OpenTerrain,
    Country,
    Urban,
}

/// Exposure of the dwelling to wind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VentilationShieldClass {
    Open,
    Normal,
    Shielded,
}

/// Direction of a facade relative to the wind, including the roof pitch
/// bands the pressure coefficient table distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacadeDirection {
    /// Roof, when cross ventilation is not possible (no pitch bands).
    Roof,
    /// Roof pitched below 10 degrees.
    Roof10,
    /// Roof pitched between 10 and 30 degrees.
    Roof10To30,
    /// Roof pitched between 30 and 60 degrees.
    Roof30,
    Windward,
    Leeward,
}

/// Roughness coefficient at the building site at 10 m (Table B.13).
pub fn terrain_roughness_coeff(terrain: TerrainClass) -> Real {
    match terrain {
        TerrainClass::OpenTerrain => 1.0,
        TerrainClass::Country => 0.9,
        TerrainClass::Urban => 0.8,
    }
}

/// Meteorological wind speed at 10 m corrected to the zone level of the
/// dwelling. The meteorological-station coefficients default to 1.
pub fn wind_speed_at_zone_level(
    c_rgh_site: Real,
    u_10: Real,
    c_top_site: Option<Real>,
    c_rgh_met: Option<Real>,
    c_top_met: Option<Real>,
) -> Real {
    let c_top_site = c_top_site.unwrap_or(1.0);
    let c_rgh_met = c_rgh_met.unwrap_or(1.0);
    let c_top_met = c_top_met.unwrap_or(1.0);

    (c_rgh_site * c_top_site) / (c_rgh_met * c_top_met) * u_10
}

/// Absolute orientation difference between two azimuths, degrees.
fn orientation_difference(orientation1: Real, orientation2: Real) -> Real {
    let diff = (orientation1 - orientation2).abs();
    if diff > 360.0 { diff - 360.0 } else { diff }
}

/// Facade direction from pitch and orientation relative to the wind.
pub fn facade_direction(
    f_cross: bool,
    orientation: Real,
    pitch: Real,
    wind_direction: Real,
) -> FacadeDirection {
    if f_cross {
        if pitch < 10.0 {
            FacadeDirection::Roof10
        } else if pitch <= 30.0 {
            FacadeDirection::Roof10To30
        } else if pitch < 60.0 {
            FacadeDirection::Roof30
        } else if orientation_difference(orientation, wind_direction) < 90.0 {
            FacadeDirection::Windward
        } else {
            FacadeDirection::Leeward
        }
    } else if pitch > 60.0 {
        FacadeDirection::Roof
    } else if orientation_difference(orientation, wind_direction) < 90.0 {
        FacadeDirection::Windward
    } else {
        FacadeDirection::Leeward
    }
}

/// Wind pressure coefficient for a flow path (Table B.7), or `None` if the
/// combination is outside the table.
pub fn wind_pressure_coefficient(
    f_cross: bool,
    shield_class: VentilationShieldClass,
    h_path: Real,
    facade: FacadeDirection,
) -> Option<Real> {
    use FacadeDirection::*;
    use VentilationShieldClass::*;

    if !f_cross {
        return match facade {
            Windward => Some(0.05),
            Leeward => Some(-0.05),
            Roof => Some(0.0),
            _ => None,
        };
    }

    if h_path < 15.0 {
        match (shield_class, facade) {
            (Open, Windward) => Some(0.50),
            (Open, Leeward) => Some(-0.70),
            (Open, Roof10) => Some(-0.70),
            (Open, Roof10To30) => Some(-0.60),
            (Open, Roof30) => Some(-0.20),
            (Normal, Windward) => Some(0.25),
            (Normal, Leeward) => Some(-0.50),
            (Normal, Roof10) => Some(-0.60),
            (Normal, Roof10To30) => Some(-0.50),
            (Normal, Roof30) => Some(-0.20),
            (Shielded, Windward) => Some(0.05),
            (Shielded, Leeward) => Some(-0.30),
            (Shielded, Roof10) => Some(-0.50),
            (Shielded, Roof10To30) => Some(-0.40),
            (Shielded, Roof30) => Some(-0.20),
            _ => None,
        }
    } else if h_path < 50.0 {
        match (shield_class, facade) {
            (Open, Windward) => Some(0.65),
            (Open, Leeward) => Some(-0.70),
            (Open, Roof10) => Some(-0.70),
            (Open, Roof10To30) => Some(-0.60),
            (Open, Roof30) => Some(-0.20),
            (Normal, Windward) => Some(0.45),
            (Normal, Leeward) => Some(-0.50),
            (Normal, Roof10) => Some(-0.60),
            (Normal, Roof10To30) => Some(-0.50),
            (Normal, Roof30) => Some(-0.20),
            (Shielded, Windward) => Some(0.25),
            (Shielded, Leeward) => Some(-0.30),
            (Shielded, Roof10) => Some(-0.50),
            (Shielded, Roof10To30) => Some(-0.40),
            (Shielded, Roof30) => Some(-0.20),
            _ => None,
        }
    } else {
        // above 50 m the table only covers open shielding
        match (shield_class, facade) {
            (Open, Windward) => Some(0.80),
            (Open, Leeward) => Some(-0.70),
            (Open, Roof10) => Some(-0.70),
            (Open, Roof10To30) => Some(-0.60),
            (Open, Roof30) => Some(-0.20),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_correction_scales_wind() {
        let u = wind_speed_at_zone_level(
            terrain_roughness_coeff(TerrainClass::Urban),
            10.0,
            None,
            None,
            None,
        );
        assert!((u - 8.0).abs() < 1e-12);
    }

    #[test]
    fn facade_direction_windward_within_quarter_turn() {
        assert_eq!(
            facade_direction(true, 180.0, 90.0, 200.0),
            FacadeDirection::Windward
        );
        assert_eq!(
            facade_direction(true, 0.0, 90.0, 200.0),
            FacadeDirection::Leeward
        );
    }

    #[test]
    fn roof_bands_only_apply_with_cross_ventilation() {
        assert_eq!(facade_direction(true, 0.0, 5.0, 0.0), FacadeDirection::Roof10);
        assert_eq!(
            facade_direction(true, 0.0, 20.0, 0.0),
            FacadeDirection::Roof10To30
        );
        assert_eq!(facade_direction(true, 0.0, 45.0, 0.0), FacadeDirection::Roof30);
        assert_eq!(facade_direction(false, 0.0, 45.0, 0.0), FacadeDirection::Windward);
        assert_eq!(facade_direction(false, 0.0, 70.0, 0.0), FacadeDirection::Roof);
    }

    #[test]
    fn table_spot_checks() {
        assert_eq!(
            wind_pressure_coefficient(
                true,
                VentilationShieldClass::Open,
                5.0,
                FacadeDirection::Windward
            ),
            Some(0.50)
        );
        assert_eq!(
            wind_pressure_coefficient(
                true,
                VentilationShieldClass::Normal,
                20.0,
                FacadeDirection::Windward
            ),
            Some(0.45)
        );
        assert_eq!(
            wind_pressure_coefficient(
                true,
                VentilationShieldClass::Open,
                60.0,
                FacadeDirection::Windward
            ),
            Some(0.80)
        );
        assert_eq!(
            wind_pressure_coefficient(
                false,
                VentilationShieldClass::Shielded,
                5.0,
                FacadeDirection::Leeward
            ),
            Some(-0.05)
        );
    }

    #[test]
    fn combinations_outside_the_table_are_none() {
        // tall path with non-open shielding
        assert_eq!(
            wind_pressure_coefficient(
                true,
                VentilationShieldClass::Normal,
                60.0,
                FacadeDirection::Windward
            ),
            None
        );
        // pitch-band roofs are a cross-ventilation concept
        assert_eq!(
            wind_pressure_coefficient(
                false,
                VentilationShieldClass::Open,
                5.0,
                FacadeDirection::Roof10
            ),
            None
        );
    }
}
