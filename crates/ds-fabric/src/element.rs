//! Building elements: the conduction paths out of a zone.
//!
//! Each element is a one-dimensional ladder of temperature nodes (ISO 52016
//! section 6.5.7): five nodes for mass-bearing constructions, two for
//! glazing. The element owns its node conductances (`h_pli`, between
//! adjacent nodes) and node heat capacities (`k_pli`); the zone heat balance
//! owns the node temperatures themselves.

use ds_climate::{ExternalConditions, WindowShading};
use ds_core::{Real, SimulationTimeIteration};
use serde::{Deserialize, Serialize};

use crate::error::{FabricError, FabricResult};
use crate::ground::{
    self, R_GR_FOR_GROUND, R_SI_FOR_GROUND, TEMP_INT_MONTHLY_FOR_GROUND,
};
use crate::surface::{
    self, H_CE, H_RE, H_RI, HeatFlowDirection, R_SE, heat_flow_direction, projected_height,
    r_si_for_pitch, sky_view_factor, therm_rad_to_sky,
};

/// Distribution of thermal mass through a construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassDistributionClass {
    /// Mass concentrated on the internal side.
    I,
    /// Mass concentrated on the external side.
    E,
    /// Mass divided over internal and external sides.
    IE,
    /// Mass equally distributed.
    D,
    /// Mass concentrated in the middle.
    M,
}

// Node conductances for a surface construction, ISO 52016 section 6.5.7.2.
fn h_pli_surface(r_c: Real) -> [Real; 4] {
    let h_outer = 6.0 / r_c;
    let h_inner = 3.0 / r_c;
    [h_outer, h_inner, h_inner, h_outer]
}

// Node heat capacities for a surface construction. The total always equals
// the declared areal heat capacity; only its placement varies.
fn k_pli_surface(class: MassDistributionClass, k_m: Real) -> [Real; 5] {
    match class {
        MassDistributionClass::I => [0.0, 0.0, 0.0, 0.0, k_m],
        MassDistributionClass::E => [k_m, 0.0, 0.0, 0.0, 0.0],
        MassDistributionClass::IE => {
            let k_ie = k_m / 2.0;
            [k_ie, 0.0, 0.0, 0.0, k_ie]
        }
        MassDistributionClass::D => {
            let k_inner = k_m / 4.0;
            let k_outer = k_m / 8.0;
            [k_outer, k_inner, k_inner, k_inner, k_outer]
        }
        MassDistributionClass::M => [0.0, 0.0, k_m, 0.0, 0.0],
    }
}

// Ground floors carry an extra virtual ground layer at node 1; the mass of
// the floor construction itself shifts one node inwards.
fn k_pli_ground(class: MassDistributionClass, k_m: Real) -> [Real; 5] {
    let k_gr = ground::K_GR_FOR_GROUND;
    match class {
        MassDistributionClass::I => [0.0, k_gr, 0.0, 0.0, k_m],
        MassDistributionClass::E => [0.0, k_gr, k_m, 0.0, 0.0],
        MassDistributionClass::IE => {
            let k_ie = k_m / 2.0;
            [0.0, k_gr, k_ie, 0.0, k_ie]
        }
        MassDistributionClass::D => {
            let k_inner = k_m / 2.0;
            let k_outer = k_m / 4.0;
            [0.0, k_gr, k_outer, k_inner, k_outer]
        }
        MassDistributionClass::M => [0.0, k_gr, 0.0, k_m, 0.0],
    }
}

fn ensure_positive(what: &'static str, value: Real) -> FabricResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(FabricError::NonPositive { what, value })
    }
}

fn ensure_pitch(pitch: Real) -> FabricResult<()> {
    if (0.0..=180.0).contains(&pitch) {
        Ok(())
    } else {
        Err(FabricError::OutOfRange {
            what: "pitch (degrees from horizontal)",
            value: pitch,
        })
    }
}

fn ensure_fraction(what: &'static str, value: Real) -> FabricResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FabricError::OutOfRange { what, value })
    }
}

/// An opaque element exposed to outside air (wall, roof, door).
#[derive(Clone, Debug)]
pub struct OpaqueElement {
    area: Real,
    r_c: Real,
    k_m: Real,
    a_sol: Real,
    /// Pitch used for the internal surface. Differs from `external_pitch`
    /// only for the unheated pitched roof case, where the roof slope faces
    /// the sun but the loft floor faces the zone.
    pitch: Real,
    external_pitch: Real,
    orientation: Real,
    base_height: Real,
    projected_height: Real,
    width: Real,
    therm_rad_to_sky: Real,
    h_pli: [Real; 4],
    k_pli: [Real; 5],
}

impl OpaqueElement {
    /// * `area` - net area, m^2 (minus any openings)
    /// * `pitch` - tilt from horizontal, degrees in [0, 180]
    /// * `a_sol` - solar absorption coefficient of the external surface
    /// * `r_c` - construction thermal resistance, (m^2 K)/W
    /// * `k_m` - areal heat capacity, J/(m^2 K)
    /// * `orientation` - azimuth of the surface normal, degrees from south
    /// * `base_height` - height of the lowest edge above ground, m
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        area: Real,
        is_unheated_pitched_roof: bool,
        pitch: Real,
        a_sol: Real,
        r_c: Real,
        k_m: Real,
        mass_distribution_class: MassDistributionClass,
        orientation: Real,
        base_height: Real,
        height: Real,
        width: Real,
    ) -> FabricResult<Self> {
        ensure_positive("opaque element area", area)?;
        ensure_positive("opaque element thermal resistance", r_c)?;
        ensure_pitch(pitch)?;
        ensure_fraction("solar absorption coefficient", a_sol)?;

        let (external_pitch, internal_pitch) = if is_unheated_pitched_roof {
            (pitch, 0.0)
        } else {
            (pitch, pitch)
        };

        Ok(Self {
            area,
            r_c,
            k_m,
            a_sol,
            pitch: internal_pitch,
            external_pitch,
            orientation,
            base_height,
            projected_height: projected_height(pitch, height),
            width,
            therm_rad_to_sky: therm_rad_to_sky(sky_view_factor(external_pitch)),
            h_pli: h_pli_surface(r_c),
            k_pli: k_pli_surface(mass_distribution_class, k_m),
        })
    }
}

/// An element bordering another conditioned zone. Treated as adiabatic for
/// heat loss but still contributes thermal mass to the zone.
#[derive(Clone, Debug)]
pub struct AdjacentConditionedElement {
    area: Real,
    pitch: Real,
    k_m: Real,
    h_pli: [Real; 4],
    k_pli: [Real; 5],
}

impl AdjacentConditionedElement {
    pub fn new(
        area: Real,
        pitch: Real,
        r_c: Real,
        k_m: Real,
        mass_distribution_class: MassDistributionClass,
    ) -> FabricResult<Self> {
        ensure_positive("adjacent element area", area)?;
        ensure_positive("adjacent element thermal resistance", r_c)?;
        ensure_pitch(pitch)?;

        Ok(Self {
            area,
            pitch,
            k_m,
            h_pli: h_pli_surface(r_c),
            k_pli: k_pli_surface(mass_distribution_class, k_m),
        })
    }
}

/// An element bordering an unconditioned space (garage, loft). The space is
/// not modeled explicitly; its effect appears as extra resistance `r_u`
/// folded into the external surface coefficient.
#[derive(Clone, Debug)]
pub struct AdjacentUnconditionedElement {
    area: Real,
    pitch: Real,
    r_c: Real,
    k_m: Real,
    h_ce: Real,
    h_pli: [Real; 4],
    k_pli: [Real; 5],
}

impl AdjacentUnconditionedElement {
    pub fn new(
        area: Real,
        pitch: Real,
        r_c: Real,
        r_u: Real,
        k_m: Real,
        mass_distribution_class: MassDistributionClass,
    ) -> FabricResult<Self> {
        ensure_positive("adjacent-unconditioned element area", area)?;
        ensure_positive("adjacent-unconditioned element thermal resistance", r_c)?;
        ensure_pitch(pitch)?;
        if r_u < 0.0 {
            return Err(FabricError::OutOfRange {
                what: "unconditioned space resistance",
                value: r_u,
            });
        }

        Ok(Self {
            area,
            pitch,
            r_c,
            k_m,
            h_ce: 1.0 / (1.0 / (H_CE + H_RE) + r_u),
            h_pli: h_pli_surface(r_c),
            k_pli: k_pli_surface(mass_distribution_class, k_m),
        })
    }
}

/// A ground-coupled floor.
#[derive(Clone, Debug)]
pub struct GroundElement {
    area: Real,
    pitch: Real,
    u_value: Real,
    k_m: Real,
    perimeter: Real,
    psi_wall_floor_junc: Real,
    h_pi: Real,
    h_pe: Real,
    h_ce: Real,
    temp_int_annual: Real,
    temp_ext_annual: Real,
    therm_rad_to_sky: Real,
    h_pli: [Real; 4],
    k_pli: [Real; 5],
}

impl GroundElement {
    /// * `total_area` - floor area across the whole dwelling, m^2 (the
    ///   ISO 13370 coefficients are defined for the entire floor even when
    ///   it is split over several zones)
    /// * `area` - floor area within this zone, m^2
    /// * `u_value` - transmittance including the ground effect, W/(m^2 K)
    /// * `r_f` - resistance of the floor construction alone, (m^2 K)/W
    /// * `d_we` - thickness of the external walls, m
    /// * `perimeter` - exposed floor perimeter, whole dwelling, m
    /// * `psi_wall_floor_junc` - wall/floor junction linear transmittance,
    ///   W/(m K)
    ///
    /// Needs a full year of weather data for the annual means the monthly
    /// ground temperature calculation is anchored on.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        total_area: Real,
        area: Real,
        pitch: Real,
        u_value: Real,
        r_f: Real,
        k_m: Real,
        mass_distribution_class: MassDistributionClass,
        floor_data: &ground::FloorData,
        d_we: Real,
        perimeter: Real,
        psi_wall_floor_junc: Real,
        conditions: &ExternalConditions,
    ) -> FabricResult<Self> {
        ensure_positive("ground element area", area)?;
        ensure_positive("ground element total area", total_area)?;
        ensure_positive("ground element u-value", u_value)?;
        ensure_positive("ground element floor resistance", r_f)?;
        ensure_positive("ground element perimeter", perimeter)?;
        ensure_pitch(pitch)?;

        // resistance of the virtual layer between the inside surface and
        // the modeled ground layer; ISO 13370 Table 2 requires it positive
        let r_vi = 1.0 / u_value - R_SI_FOR_GROUND - r_f - R_GR_FOR_GROUND;
        if r_vi <= 0.0 {
            return Err(FabricError::GroundVirtualResistance { r_vi });
        }

        let temp_ext_annual = conditions
            .air_temp_annual()
            .ok_or(FabricError::AnnualWeatherUnavailable)?;

        let d_eq = ground::total_equiv_thickness(d_we, r_f);
        let (h_pi, h_pe) = ground::periodic_coefficients(
            floor_data,
            total_area,
            perimeter,
            d_eq,
            r_f,
            d_we,
            conditions.wind_speed_annual(),
        )?;

        // ISO 52016 states r_c (including the ground effect) should be used
        // for the node conductances, but that double-counts r_si, r_gr and
        // r_vi which are accounted for separately; use r_f instead
        let r_gr = R_GR_FOR_GROUND;
        let h_pli = [
            2.0 / r_gr,
            1.0 / (r_f / 4.0 + r_gr / 2.0),
            2.0 / r_f,
            4.0 / r_f,
        ];

        Ok(Self {
            area,
            pitch,
            u_value,
            k_m,
            perimeter,
            psi_wall_floor_junc,
            h_pi,
            h_pe,
            h_ce: 1.0 / r_vi,
            temp_int_annual: ground::average_monthly_to_annual(TEMP_INT_MONTHLY_FOR_GROUND),
            temp_ext_annual,
            // in contact with the ground, so no sky view
            therm_rad_to_sky: 0.0,
            h_pli,
            k_pli: k_pli_ground(mass_distribution_class, k_m),
        })
    }

    /// Equivalent external temperature under the floor for the current
    /// month, ISO 13370 eqns C.4 and F.2.
    fn temp_ext(&self, conditions: &ExternalConditions, it: &SimulationTimeIteration) -> Real {
        let temp_ext_month = conditions.air_temp_monthly(it.current_month_start_end_hours());
        let temp_int_month = TEMP_INT_MONTHLY_FOR_GROUND[it.current_month()];

        let heat_flow_month = self.u_value * self.area * (self.temp_int_annual - self.temp_ext_annual)
            + self.perimeter * self.psi_wall_floor_junc * (temp_int_month - temp_ext_month)
            - self.h_pi * (self.temp_int_annual - temp_int_month)
            + self.h_pe * (self.temp_ext_annual - temp_ext_month);

        temp_int_month
            - (heat_flow_month
                - self.perimeter
                    * self.psi_wall_floor_junc
                    * (self.temp_int_annual - self.temp_ext_annual))
                / (self.area * self.u_value)
    }
}

/// A transparent element (window, glazed door).
#[derive(Clone, Debug)]
pub struct TransparentElement {
    area: Real,
    r_c: Real,
    pitch: Real,
    orientation: Real,
    g_value: Real,
    frame_area_fraction: Real,
    base_height: Real,
    projected_height: Real,
    width: Real,
    /// Window-local shading, reveals already expanded.
    shading: Vec<WindowShading>,
    therm_rad_to_sky: Real,
    h_pli: [Real; 1],
    k_pli: [Real; 2],
}

impl TransparentElement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pitch: Real,
        r_c: Real,
        orientation: Real,
        g_value: Real,
        frame_area_fraction: Real,
        base_height: Real,
        height: Real,
        width: Real,
        shading: &[WindowShading],
    ) -> FabricResult<Self> {
        ensure_positive("transparent element height", height)?;
        ensure_positive("transparent element width", width)?;
        ensure_positive("transparent element thermal resistance", r_c)?;
        ensure_pitch(pitch)?;
        ensure_fraction("g-value", g_value)?;
        ensure_fraction("frame area fraction", frame_area_fraction)?;

        Ok(Self {
            area: height * width,
            r_c,
            pitch,
            orientation,
            g_value,
            frame_area_fraction,
            base_height,
            projected_height: projected_height(pitch, height),
            width,
            shading: WindowShading::expand(shading),
            therm_rad_to_sky: therm_rad_to_sky(sky_view_factor(pitch)),
            h_pli: [1.0 / r_c],
            k_pli: [0.0, 0.0],
        })
    }

    /// g-value corrected for the angular distribution of solar radiation
    /// (ISO 52016 App B Table B.22 default correction factor).
    fn angular_g_value(&self) -> Real {
        const FW: Real = 0.90;
        FW * self.g_value
    }
}

/// A building element of any construction family.
///
/// The node-ladder shape is fixed per family: mass-bearing families carry
/// 5 temperature nodes and 4 internode conductances, transparent elements
/// 2 nodes and 1 conductance.
#[derive(Clone, Debug)]
pub enum BuildingElement {
    Opaque(OpaqueElement),
    AdjacentConditioned(AdjacentConditionedElement),
    AdjacentUnconditioned(AdjacentUnconditionedElement),
    Ground(GroundElement),
    Transparent(TransparentElement),
}

impl BuildingElement {
    pub fn area(&self) -> Real {
        match self {
            BuildingElement::Opaque(e) => e.area,
            BuildingElement::AdjacentConditioned(e) => e.area,
            BuildingElement::AdjacentUnconditioned(e) => e.area,
            BuildingElement::Ground(e) => e.area,
            BuildingElement::Transparent(e) => e.area,
        }
    }

    /// Pitch of the internal surface, degrees from horizontal.
    pub fn pitch(&self) -> Real {
        match self {
            BuildingElement::Opaque(e) => e.pitch,
            BuildingElement::AdjacentConditioned(e) => e.pitch,
            BuildingElement::AdjacentUnconditioned(e) => e.pitch,
            BuildingElement::Ground(e) => e.pitch,
            BuildingElement::Transparent(e) => e.pitch,
        }
    }

    /// Solar absorption coefficient of the external surface.
    pub fn a_sol(&self) -> Real {
        match self {
            BuildingElement::Opaque(e) => e.a_sol,
            // transparent gains are handled via solar_gains; absorbed solar
            // is zero for the remaining families by definition
            _ => 0.0,
        }
    }

    /// Longwave radiative loss coefficient to the sky, W/m^2.
    pub fn therm_rad_to_sky(&self) -> Real {
        match self {
            BuildingElement::Opaque(e) => e.therm_rad_to_sky,
            BuildingElement::Transparent(e) => e.therm_rad_to_sky,
            _ => 0.0,
        }
    }

    pub fn heat_flow_direction(
        &self,
        temp_int_air: Real,
        temp_int_surface: Real,
    ) -> HeatFlowDirection {
        heat_flow_direction(self.pitch(), temp_int_air, temp_int_surface)
    }

    /// Internal surface resistance, (m^2 K)/W.
    pub fn r_si(&self) -> Real {
        r_si_for_pitch(self.pitch())
    }

    /// External surface resistance, (m^2 K)/W.
    pub fn r_se(&self) -> Real {
        R_SE
    }

    /// Internal convective coefficient, W/(m^2 K).
    pub fn h_ci(&self, temp_int_air: Real, temp_int_surface: Real) -> Real {
        surface::h_ci_for(self.heat_flow_direction(temp_int_air, temp_int_surface))
    }

    /// Internal radiative coefficient, W/(m^2 K).
    pub fn h_ri(&self) -> Real {
        H_RI
    }

    /// External convective coefficient, W/(m^2 K).
    pub fn h_ce(&self) -> Real {
        match self {
            BuildingElement::Opaque(_) | BuildingElement::Transparent(_) => H_CE,
            // no convective exchange across a conditioned boundary
            BuildingElement::AdjacentConditioned(_) => 0.0,
            BuildingElement::AdjacentUnconditioned(e) => e.h_ce,
            BuildingElement::Ground(e) => e.h_ce,
        }
    }

    /// External radiative coefficient, W/(m^2 K).
    pub fn h_re(&self) -> Real {
        match self {
            BuildingElement::Opaque(_) | BuildingElement::Transparent(_) => H_RE,
            _ => 0.0,
        }
    }

    /// Node heat capacities, external node first, J/(m^2 K).
    pub fn k_pli(&self) -> &[Real] {
        match self {
            BuildingElement::Opaque(e) => &e.k_pli,
            BuildingElement::AdjacentConditioned(e) => &e.k_pli,
            BuildingElement::AdjacentUnconditioned(e) => &e.k_pli,
            BuildingElement::Ground(e) => &e.k_pli,
            BuildingElement::Transparent(e) => &e.k_pli,
        }
    }

    /// Internode conductances, external pair first, W/(m^2 K).
    pub fn h_pli(&self) -> &[Real] {
        match self {
            BuildingElement::Opaque(e) => &e.h_pli,
            BuildingElement::AdjacentConditioned(e) => &e.h_pli,
            BuildingElement::AdjacentUnconditioned(e) => &e.h_pli,
            BuildingElement::Ground(e) => &e.h_pli,
            BuildingElement::Transparent(e) => &e.h_pli,
        }
    }

    /// Temperature nodes, including the external and internal surface nodes.
    pub fn number_of_nodes(&self) -> usize {
        self.k_pli().len()
    }

    /// Temperature nodes between the two surface nodes.
    pub fn number_of_inside_nodes(&self) -> usize {
        self.number_of_nodes() - 2
    }

    /// Temperature of the air (or equivalent) on the far side, degC.
    pub fn temp_ext(&self, conditions: &ExternalConditions, it: &SimulationTimeIteration) -> Real {
        match self {
            BuildingElement::Ground(e) => e.temp_ext(conditions, it),
            _ => conditions.air_temp(it),
        }
    }

    /// Steady-state heat transfer coefficient, W/K, for heat loss reporting.
    pub fn fabric_heat_loss(&self) -> Real {
        match self {
            BuildingElement::Opaque(e) => {
                let u_value = 1.0 / (e.r_c + self.r_se() + self.r_si());
                e.area * u_value
            }
            // adiabatic towards other conditioned zones
            BuildingElement::AdjacentConditioned(_) => 0.0,
            BuildingElement::AdjacentUnconditioned(e) => {
                let u_value = 1.0 / (e.r_c + self.r_se() + self.r_si());
                e.area * u_value
            }
            BuildingElement::Ground(e) => e.u_value * e.area,
            BuildingElement::Transparent(e) => {
                // effective window u-value assumes use of curtains/blinds
                let r_curtains_blinds = 0.04;
                let u_value = 1.0 / (e.r_c + self.r_si() + self.r_se() + r_curtains_blinds);
                e.area * u_value
            }
        }
    }

    /// Fabric heat capacity, kJ/K.
    pub fn heat_capacity(&self) -> Real {
        let k_m = match self {
            BuildingElement::Opaque(e) => e.k_m,
            BuildingElement::AdjacentConditioned(e) => e.k_m,
            BuildingElement::AdjacentUnconditioned(e) => e.k_m,
            BuildingElement::Ground(e) => e.k_m,
            // glazing mass is not included in heat loss calculations
            BuildingElement::Transparent(_) => return 0.0,
        };
        self.area() * k_m / 1_000.0
    }

    /// Direct and diffuse irradiance on the external surface, W/m^2. Zero
    /// for families with no solar-exposed surface.
    pub fn i_sol_dir_dif(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> (Real, Real) {
        match self {
            BuildingElement::Opaque(e) => {
                let irr = conditions.surface_irradiance(e.external_pitch, e.orientation, it);
                (irr.direct, irr.diffuse)
            }
            _ => (0.0, 0.0),
        }
    }

    /// Shading reduction factors (direct, diffuse) for the external surface.
    pub fn shading_factors_direct_diffuse(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> FabricResult<(Real, Real)> {
        match self {
            BuildingElement::Opaque(e) => Ok(conditions.shading_reduction_factor_direct_diffuse(
                e.base_height,
                e.projected_height,
                e.width,
                e.external_pitch,
                e.orientation,
                &[],
                it,
            )?),
            BuildingElement::Transparent(e) => {
                Ok(conditions.shading_reduction_factor_direct_diffuse(
                    e.base_height,
                    e.projected_height,
                    e.width,
                    e.pitch,
                    e.orientation,
                    &e.shading,
                    it,
                )?)
            }
            _ => Ok((1.0, 1.0)),
        }
    }

    /// Solar gains through the element into the zone, W. Non-zero only for
    /// transparent elements.
    pub fn solar_gains(
        &self,
        conditions: &ExternalConditions,
        it: &SimulationTimeIteration,
    ) -> FabricResult<Real> {
        match self {
            BuildingElement::Transparent(e) => {
                let irr = conditions.surface_irradiance(e.pitch, e.orientation, it);
                let (f_sh_dir, f_sh_dif) = self.shading_factors_direct_diffuse(conditions, it)?;
                Ok(e.angular_g_value()
                    * (irr.diffuse * f_sh_dif + irr.direct * f_sh_dir)
                    * e.area
                    * (1.0 - e.frame_area_fraction))
            }
            _ => Ok(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::{FloorData, K_GR_FOR_GROUND};
    use ds_climate::{ShadingSegment, SiteGeometry, WeatherSeries};
    use ds_core::SimulationTime;
    use proptest::prelude::*;

    const ALL_CLASSES: [MassDistributionClass; 5] = [
        MassDistributionClass::I,
        MassDistributionClass::E,
        MassDistributionClass::IE,
        MassDistributionClass::D,
        MassDistributionClass::M,
    ];

    fn full_circle_segments() -> Vec<ShadingSegment> {
        vec![
            ShadingSegment {
                start: 180.0,
                end: 0.0,
                objects: vec![],
            },
            ShadingSegment {
                start: 0.0,
                end: -180.0,
                objects: vec![],
            },
        ]
    }

    // 24h run over a full year of (synthetic, seasonally varying) weather,
    // so annual and monthly means are available
    fn test_conditions() -> (SimulationTime, ExternalConditions) {
        let time = SimulationTime::new(0.0, 24.0, 1.0).unwrap();
        let n = 8760;
        let air_temps: Vec<f64> = (0..n)
            .map(|h| {
                10.0 - 8.0 * (2.0 * std::f64::consts::PI * h as f64 / 8760.0).cos()
            })
            .collect();
        let weather = WeatherSeries {
            air_temps,
            wind_speeds: vec![4.0; n],
            wind_directions: vec![180.0; n],
            diffuse_horizontal_radiation: vec![100.0; n],
            direct_beam_radiation: vec![300.0; n],
            ground_reflectivity: vec![0.2; n],
            time_series_step: 1.0,
            direct_beam_conversion_needed: false,
        };
        let site = SiteGeometry {
            latitude: 51.5,
            longitude: -0.1,
            timezone: 0.0,
            leap_year: false,
            shading_segments: full_circle_segments(),
        };
        let conditions = ExternalConditions::new(&time, weather, site).unwrap();
        (time, conditions)
    }

    fn opaque_wall(class: MassDistributionClass) -> BuildingElement {
        BuildingElement::Opaque(
            OpaqueElement::new(
                20.0, false, 90.0, 0.6, 1.5, 19_000.0, class, 0.0, 0.0, 2.5, 8.0,
            )
            .unwrap(),
        )
    }

    fn window() -> BuildingElement {
        BuildingElement::Transparent(
            TransparentElement::new(90.0, 0.4, 0.0, 0.75, 0.25, 1.0, 1.25, 4.0, &[]).unwrap(),
        )
    }

    fn ground_floor(conditions: &ExternalConditions) -> BuildingElement {
        BuildingElement::Ground(
            GroundElement::new(
                20.0,
                20.0,
                180.0,
                0.7,
                1.1,
                19_000.0,
                MassDistributionClass::IE,
                &FloorData::SlabNoEdgeInsulation,
                0.3,
                18.0,
                0.05,
                conditions,
            )
            .unwrap(),
        )
    }

    #[test]
    fn mass_distribution_preserves_total_capacity() {
        for class in ALL_CLASSES {
            let wall = opaque_wall(class);
            let total: f64 = wall.k_pli().iter().sum();
            assert!((total - 19_000.0).abs() < 1e-9, "class {class:?}");
        }
    }

    #[test]
    fn ground_capacity_adds_the_ground_layer() {
        let (_, conditions) = test_conditions();
        let floor = ground_floor(&conditions);
        let total: f64 = floor.k_pli().iter().sum();
        assert!((total - (19_000.0 + K_GR_FOR_GROUND)).abs() < 1e-6);
    }

    #[test]
    fn node_counts_per_family() {
        let (_, conditions) = test_conditions();
        let mass_bearing = [
            opaque_wall(MassDistributionClass::D),
            BuildingElement::AdjacentConditioned(
                AdjacentConditionedElement::new(10.0, 90.0, 1.0, 15_000.0, MassDistributionClass::D)
                    .unwrap(),
            ),
            BuildingElement::AdjacentUnconditioned(
                AdjacentUnconditionedElement::new(
                    10.0,
                    90.0,
                    1.0,
                    0.5,
                    15_000.0,
                    MassDistributionClass::D,
                )
                .unwrap(),
            ),
            ground_floor(&conditions),
        ];
        for element in &mass_bearing {
            assert_eq!(element.number_of_nodes(), 5);
            assert_eq!(element.number_of_inside_nodes(), 3);
            assert_eq!(element.h_pli().len(), element.number_of_nodes() - 1);
        }
        let glazing = window();
        assert_eq!(glazing.number_of_nodes(), 2);
        assert_eq!(glazing.number_of_inside_nodes(), 0);
        assert_eq!(glazing.h_pli().len(), 1);
    }

    #[test]
    fn conditioned_boundary_is_adiabatic() {
        let wall = BuildingElement::AdjacentConditioned(
            AdjacentConditionedElement::new(10.0, 90.0, 1.0, 15_000.0, MassDistributionClass::I)
                .unwrap(),
        );
        assert_eq!(wall.fabric_heat_loss(), 0.0);
        assert_eq!(wall.h_ce(), 0.0);
        assert_eq!(wall.h_re(), 0.0);
        assert_eq!(wall.a_sol(), 0.0);
        assert_eq!(wall.therm_rad_to_sky(), 0.0);
        // still carries its mass
        assert!((wall.heat_capacity() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn unconditioned_space_resistance_lowers_external_coefficient() {
        let make = |r_u| {
            BuildingElement::AdjacentUnconditioned(
                AdjacentUnconditionedElement::new(
                    10.0,
                    90.0,
                    1.0,
                    r_u,
                    15_000.0,
                    MassDistributionClass::I,
                )
                .unwrap(),
            )
        };
        let sheltered = make(0.5);
        let bare = make(0.0);
        assert!(sheltered.h_ce() < bare.h_ce());
        assert!((bare.h_ce() - (H_CE + H_RE)).abs() < 1e-9);
        assert_eq!(sheltered.h_re(), 0.0);
    }

    #[test]
    fn opaque_fabric_heat_loss_uses_surface_resistances() {
        let wall = opaque_wall(MassDistributionClass::D);
        let expected_u = 1.0 / (1.5 + R_SE + surface::R_SI_HORIZONTAL);
        assert!((wall.fabric_heat_loss() - 20.0 * expected_u).abs() < 1e-9);
    }

    #[test]
    fn transparent_heat_loss_includes_curtain_allowance() {
        let glazing = window();
        let expected_u = 1.0 / (0.4 + surface::R_SI_HORIZONTAL + R_SE + 0.04);
        assert!((glazing.fabric_heat_loss() - 5.0 * expected_u).abs() < 1e-9);
        assert_eq!(glazing.heat_capacity(), 0.0);
    }

    #[test]
    fn vertical_elements_report_horizontal_flow_for_any_temperatures() {
        let wall = opaque_wall(MassDistributionClass::D);
        for (air, surf) in [(25.0, 5.0), (5.0, 25.0), (18.0, 18.0)] {
            assert_eq!(
                wall.heat_flow_direction(air, surf),
                HeatFlowDirection::Horizontal
            );
        }
    }

    #[test]
    fn ground_rejects_nonpositive_virtual_resistance() {
        let (_, conditions) = test_conditions();
        // u-value too high for the construction resistance
        let result = GroundElement::new(
            20.0,
            20.0,
            180.0,
            2.5,
            1.1,
            19_000.0,
            MassDistributionClass::IE,
            &FloorData::SlabNoEdgeInsulation,
            0.3,
            18.0,
            0.05,
            &conditions,
        );
        assert!(matches!(
            result,
            Err(FabricError::GroundVirtualResistance { .. })
        ));
    }

    #[test]
    fn ground_external_temperature_tracks_the_seasons() {
        let (time, conditions) = test_conditions();
        let floor = ground_floor(&conditions);
        let it = time.iter().next().unwrap();
        let temp = floor.temp_ext(&conditions, &it);
        assert!(temp.is_finite());
        // damped towards the internal annual mean, so well above the
        // January air temperature in the synthetic series
        assert!(temp > conditions.air_temp(&it));
    }

    #[test]
    fn window_solar_gains_positive_at_midday() {
        let (time, conditions) = test_conditions();
        let glazing = window();
        let midday = time.iter().nth(12).unwrap();
        let gains = glazing.solar_gains(&conditions, &midday).unwrap();
        assert!(gains > 0.0);
        let night = time.iter().next().unwrap();
        let gains_night = glazing.solar_gains(&conditions, &night).unwrap();
        assert_eq!(gains_night, 0.0);
    }

    #[test]
    fn opaque_elements_have_no_direct_solar_gains() {
        let (time, conditions) = test_conditions();
        let wall = opaque_wall(MassDistributionClass::D);
        let midday = time.iter().nth(12).unwrap();
        assert_eq!(wall.solar_gains(&conditions, &midday).unwrap(), 0.0);
        let (dir, dif) = wall.i_sol_dir_dif(&conditions, &midday);
        assert!(dir >= 0.0);
        assert!(dif > 0.0);
    }

    proptest! {
        #[test]
        fn capacity_total_invariant_over_distribution(
            k_m in 1_000.0..1.0e6_f64,
            class_idx in 0usize..5,
        ) {
            let wall = opaque_wall(ALL_CLASSES[class_idx]);
            // rebuild with the sampled capacity
            let wall = match wall {
                BuildingElement::Opaque(_) => BuildingElement::Opaque(
                    OpaqueElement::new(
                        20.0, false, 90.0, 0.6, 1.5, k_m, ALL_CLASSES[class_idx],
                        0.0, 0.0, 2.5, 8.0,
                    )
                    .unwrap(),
                ),
                other => other,
            };
            let total: f64 = wall.k_pli().iter().sum();
            prop_assert!((total - k_m).abs() < 1e-6 * k_m.max(1.0));
        }
    }
}
