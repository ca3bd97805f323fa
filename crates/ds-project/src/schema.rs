//! Dwelling document schema definitions.

use ds_airflow::{
    CombustionAirSupply, CombustionApplianceKind, CombustionFuel, FlueGasExhaust, TerrainClass,
    VentilationDuty, VentilationShieldClass,
};
use ds_climate::{ShadingSegment, WindowShading};
use ds_fabric::{FloorData, MassDistributionClass, ThermalBridge};
use ds_zone::SetpointBasis;
use serde::{Deserialize, Serialize};

/// Schema version written by this release.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dwelling {
    pub version: u32,
    pub name: String,
    pub simulation_time: SimulationTimeDef,
    pub external_conditions: ExternalConditionsDef,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    pub infiltration_ventilation: InfiltrationVentilationDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationTimeDef {
    pub start_hour: f64,
    pub end_hour: f64,
    pub step_hours: f64,
}

/// Weather time series plus the static site geometry the solar model needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalConditionsDef {
    pub air_temps_c: Vec<f64>,
    pub wind_speeds_m_per_s: Vec<f64>,
    pub wind_directions_deg: Vec<f64>,
    pub diffuse_horizontal_radiation_w_per_m2: Vec<f64>,
    pub direct_beam_radiation_w_per_m2: Vec<f64>,
    pub ground_reflectivity: Vec<f64>,
    #[serde(default = "default_step_hours")]
    pub time_series_step_hours: f64,
    #[serde(default)]
    pub direct_beam_conversion_needed: bool,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub timezone_hours: f64,
    #[serde(default)]
    pub leap_year: bool,
    #[serde(default)]
    pub shading_segments: Vec<ShadingSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub id: String,
    pub area_m2: f64,
    pub volume_m3: f64,
    #[serde(default = "default_setpoint_basis")]
    pub setpoint_basis: SetpointBasis,
    /// Setpoint assumed when settling the initial node temperatures, C.
    pub temp_setpnt_init_c: f64,
    #[serde(default)]
    pub building_elements: Vec<BuildingElementDef>,
    #[serde(default)]
    pub thermal_bridging: ThermalBridgingDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating: Option<HeaterDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_setpoints: Option<SetpointScheduleDef>,
    /// Setpoint above which window-opening cooling is allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vent_cooling_setpoints: Option<SetpointScheduleDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_gains: Option<GainsScheduleDef>,
}

/// A direct-acting heat emitter serving one zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaterDef {
    pub rated_power_kw: f64,
    pub frac_convective: f64,
    pub setpoints: SetpointScheduleDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetpointScheduleDef {
    /// One entry per schedule step; `null` means no requirement.
    pub setpoints_c: Vec<Option<f64>>,
    /// Day of the year (0-based) the first entry applies to.
    #[serde(default)]
    pub start_day: u32,
    #[serde(default = "default_step_hours")]
    pub step_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_min_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_max_c: Option<f64>,
    #[serde(default)]
    pub default_to_max: bool,
    /// Hours before each scheduled period during which its setpoint already
    /// applies.
    #[serde(default)]
    pub advanced_start_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnOffScheduleDef {
    pub values: Vec<bool>,
    /// Day of the year (0-based) the first entry applies to.
    #[serde(default)]
    pub start_day: u32,
    #[serde(default = "default_step_hours")]
    pub step_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GainsScheduleDef {
    pub values_w: Vec<f64>,
    #[serde(default = "default_step_hours")]
    pub step_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BuildingElementDef {
    Opaque {
        area_m2: f64,
        pitch_deg: f64,
        #[serde(default)]
        is_unheated_pitched_roof: bool,
        solar_absorption_coeff: f64,
        thermal_resistance_construction: f64,
        areal_heat_capacity_j_per_m2k: f64,
        mass_distribution: MassDistributionClass,
        orientation_deg: f64,
        base_height_m: f64,
        height_m: f64,
        width_m: f64,
    },
    AdjacentConditioned {
        area_m2: f64,
        pitch_deg: f64,
        thermal_resistance_construction: f64,
        areal_heat_capacity_j_per_m2k: f64,
        mass_distribution: MassDistributionClass,
    },
    AdjacentUnconditioned {
        area_m2: f64,
        pitch_deg: f64,
        thermal_resistance_construction: f64,
        thermal_resistance_unconditioned: f64,
        areal_heat_capacity_j_per_m2k: f64,
        mass_distribution: MassDistributionClass,
    },
    Ground {
        total_area_m2: f64,
        area_m2: f64,
        pitch_deg: f64,
        u_value: f64,
        thermal_resistance_floor: f64,
        areal_heat_capacity_j_per_m2k: f64,
        mass_distribution: MassDistributionClass,
        floor: FloorData,
        wall_thickness_m: f64,
        perimeter_m: f64,
        psi_wall_floor_junction: f64,
    },
    Transparent {
        pitch_deg: f64,
        thermal_resistance_construction: f64,
        orientation_deg: f64,
        g_value: f64,
        frame_area_fraction: f64,
        base_height_m: f64,
        height_m: f64,
        width_m: f64,
        #[serde(default)]
        shading: Vec<WindowShading>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ThermalBridgingDef {
    /// A single lumped transmittance, W/K.
    Coefficient { heat_transfer_coefficient: f64 },
    Bridges { bridges: Vec<ThermalBridge> },
}

impl Default for ThermalBridgingDef {
    fn default() -> Self {
        ThermalBridgingDef::Coefficient {
            heat_transfer_coefficient: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfiltrationVentilationDef {
    #[serde(default)]
    pub cross_ventilation: bool,
    pub shield_class: VentilationShieldClass,
    pub terrain_class: TerrainClass,
    #[serde(default)]
    pub altitude_m: f64,
    /// Height of the ventilation zone; leak paths are placed against it.
    pub ventilation_zone_height_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ach_min_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ach_max_target: Option<f64>,
    #[serde(default = "default_vent_opening_ratio")]
    pub vent_opening_ratio_init: f64,
    #[serde(default)]
    pub windows: Vec<WindowDef>,
    #[serde(default)]
    pub vents: Vec<VentDef>,
    pub leakage: LeakageDef,
    #[serde(default)]
    pub mechanical: Vec<MechanicalVentilationDef>,
    #[serde(default)]
    pub combustion_appliances: Vec<CombustionApplianceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowDef {
    /// Height of the openable part, m.
    pub free_area_height_m: f64,
    /// Mid height of the openable part above the zone floor, m.
    pub mid_height_m: f64,
    pub max_free_area_m2: f64,
    #[serde(default = "default_window_parts")]
    pub parts: usize,
    pub orientation_deg: f64,
    pub pitch_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<OnOffScheduleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VentDef {
    pub mid_height_m: f64,
    /// Equivalent area per EN 13141-1/-2, cm^2.
    pub equivalent_area_cm2: f64,
    #[serde(default = "default_vent_ref_pressure")]
    pub ref_pressure_difference_pa: f64,
    pub orientation_deg: f64,
    pub pitch_deg: f64,
}

/// Envelope airtightness from a pressure test, apportioned over the
/// facades and roof by the model builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeakageDef {
    /// Test pressure difference, Pa (50 for a blower door).
    pub test_pressure_pa: f64,
    /// Air change measured at the test pressure, m^3/(h m^2).
    pub test_result_qv_per_m2: f64,
    /// Envelope reference area of the airtightness index, m^2.
    pub env_area_m2: f64,
    pub area_facades_m2: f64,
    pub area_roof_m2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MechanicalVentilationDef {
    pub duty: VentilationDuty,
    pub design_flow_rate_m3_per_h: f64,
    #[serde(default)]
    pub heat_recovery_efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<OnOffScheduleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombustionApplianceDef {
    pub air_supply: CombustionAirSupply,
    pub exhaust: FlueGasExhaust,
    pub fuel: CombustionFuel,
    pub appliance: CombustionApplianceKind,
    pub heat_input_kw: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<OnOffScheduleDef>,
}

fn default_step_hours() -> f64 {
    1.0
}

fn default_setpoint_basis() -> SetpointBasis {
    SetpointBasis::Air
}

fn default_vent_opening_ratio() -> f64 {
    1.0
}

fn default_window_parts() -> usize {
    1
}

fn default_vent_ref_pressure() -> f64 {
    20.0
}
