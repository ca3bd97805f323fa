//! Build runtime simulation objects from a validated dwelling document.

use crate::schema::{
    BuildingElementDef, Dwelling, GainsScheduleDef, InfiltrationVentilationDef, OnOffScheduleDef,
    SetpointScheduleDef, ThermalBridgingDef, ZoneDef,
};
use crate::{ProjectError, ProjectResult, ValidationError};
use ds_airflow::{
    CombustionAppliance, FacadeDirection, Leak, MechanicalVentilation, Vent, VentilationNetwork,
    Window,
};
use ds_climate::{ExternalConditions, SiteGeometry, WeatherSeries};
use ds_controls::{OnOffTimeControl, SetpointTimeControl};
use ds_core::{Real, SimulationTime, SimulationTimeIteration};
use ds_fabric::{
    AdjacentConditionedElement, AdjacentUnconditionedElement, BuildingElement, GroundElement,
    OpaqueElement, TransparentElement,
};
use ds_zone::{DirectHeater, ThermalBridging, Zone};

/// Everything the run loop needs, built once from the document.
pub struct Model {
    pub name: String,
    pub simulation_time: SimulationTime,
    pub conditions: ExternalConditions,
    pub zones: Vec<ZoneModel>,
    pub ventilation: VentilationModel,
}

/// One zone with its schedules and heat source.
pub struct ZoneModel {
    pub id: String,
    pub zone: Zone,
    pub heater: Option<DirectHeater>,
    pub heating_setpoints: Option<SetpointTimeControl>,
    pub cooling_setpoints: Option<SetpointTimeControl>,
    pub gains_internal: Option<InternalGains>,
}

impl ZoneModel {
    /// Internal gains for the current timestep, W. Zero without a schedule.
    pub fn gains_internal_w(&self, it: &SimulationTimeIteration) -> Real {
        match &self.gains_internal {
            Some(gains) => gains.gains_w(it),
            None => 0.0,
        }
    }
}

/// A repeating internal-gains series.
pub struct InternalGains {
    values_w: Vec<Real>,
    step_hours: Real,
}

impl InternalGains {
    pub fn gains_w(&self, it: &SimulationTimeIteration) -> Real {
        self.values_w[it.time_series_idx(self.step_hours) % self.values_w.len()]
    }
}

/// The dwelling-level airflow network and its opening-ratio policy.
pub struct VentilationModel {
    pub network: VentilationNetwork,
    pub ach_min_target: Option<Real>,
    pub ach_max_target: Option<Real>,
    pub vent_opening_ratio_init: Real,
}

pub fn build_model(dwelling: &Dwelling) -> ProjectResult<Model> {
    let time_def = &dwelling.simulation_time;
    let simulation_time =
        SimulationTime::new(time_def.start_hour, time_def.end_hour, time_def.step_hours)?;

    let conditions_def = &dwelling.external_conditions;
    let conditions = ExternalConditions::new(
        &simulation_time,
        WeatherSeries {
            air_temps: conditions_def.air_temps_c.clone(),
            wind_speeds: conditions_def.wind_speeds_m_per_s.clone(),
            wind_directions: conditions_def.wind_directions_deg.clone(),
            diffuse_horizontal_radiation: conditions_def
                .diffuse_horizontal_radiation_w_per_m2
                .clone(),
            direct_beam_radiation: conditions_def.direct_beam_radiation_w_per_m2.clone(),
            ground_reflectivity: conditions_def.ground_reflectivity.clone(),
            time_series_step: conditions_def.time_series_step_hours,
            direct_beam_conversion_needed: conditions_def.direct_beam_conversion_needed,
        },
        SiteGeometry {
            latitude: conditions_def.latitude_deg,
            longitude: conditions_def.longitude_deg,
            timezone: conditions_def.timezone_hours,
            leap_year: conditions_def.leap_year,
            shading_segments: conditions_def.shading_segments.clone(),
        },
    )?;

    let Some(first_step) = simulation_time.iter().next() else {
        return Err(ProjectError::Validation(ValidationError::InvalidValue {
            field: "simulation_time".to_string(),
            value: time_def.end_hour.to_string(),
            reason: "run spans no timesteps".to_string(),
        }));
    };
    let temp_ext_air_init = conditions.air_temp(&first_step);

    if dwelling.zones.is_empty() {
        return Err(ProjectError::Validation(ValidationError::InvalidValue {
            field: "zones".to_string(),
            value: "0".to_string(),
            reason: "a dwelling model needs at least one zone".to_string(),
        }));
    }

    let mut zones = Vec::with_capacity(dwelling.zones.len());
    for zone_def in &dwelling.zones {
        zones.push(build_zone(zone_def, &conditions, &first_step, temp_ext_air_init)?);
    }

    let total_volume = dwelling.zones.iter().map(|zone| zone.volume_m3).sum();
    let ventilation = build_ventilation(&dwelling.infiltration_ventilation, total_volume)?;

    Ok(Model {
        name: dwelling.name.clone(),
        simulation_time,
        conditions,
        zones,
        ventilation,
    })
}

fn build_zone(
    zone_def: &ZoneDef,
    conditions: &ExternalConditions,
    it: &SimulationTimeIteration,
    temp_ext_air_init: Real,
) -> ProjectResult<ZoneModel> {
    let mut elements = Vec::with_capacity(zone_def.building_elements.len());
    for element_def in &zone_def.building_elements {
        elements.push(build_element(element_def, conditions)?);
    }

    let thermal_bridging = match &zone_def.thermal_bridging {
        ThermalBridgingDef::Coefficient {
            heat_transfer_coefficient,
        } => ThermalBridging::Coefficient(*heat_transfer_coefficient),
        ThermalBridgingDef::Bridges { bridges } => ThermalBridging::Bridges(bridges.clone()),
    };

    let vent_cool_control = zone_def
        .vent_cooling_setpoints
        .as_ref()
        .map(setpoint_control)
        .transpose()?;

    let zone = Zone::new(
        zone_def.area_m2,
        zone_def.volume_m3,
        elements,
        thermal_bridging,
        temp_ext_air_init,
        zone_def.temp_setpnt_init_c,
        zone_def.setpoint_basis,
        vent_cool_control,
        conditions,
        it,
    )?;

    let (heater, heating_setpoints) = match &zone_def.heating {
        Some(heater_def) => {
            let control = setpoint_control(&heater_def.setpoints)?;
            let heater = DirectHeater::new(
                ds_core::units::kw(heater_def.rated_power_kw),
                heater_def.frac_convective,
                Some(control.clone()),
            );
            (Some(heater), Some(control))
        }
        None => (None, None),
    };

    let cooling_setpoints = zone_def
        .cooling_setpoints
        .as_ref()
        .map(setpoint_control)
        .transpose()?;

    let gains_internal = zone_def
        .internal_gains
        .as_ref()
        .map(|gains: &GainsScheduleDef| InternalGains {
            values_w: gains.values_w.clone(),
            step_hours: gains.step_hours,
        });

    Ok(ZoneModel {
        id: zone_def.id.clone(),
        zone,
        heater,
        heating_setpoints,
        cooling_setpoints,
        gains_internal,
    })
}

fn build_element(
    element_def: &BuildingElementDef,
    conditions: &ExternalConditions,
) -> ProjectResult<BuildingElement> {
    let element = match element_def {
        BuildingElementDef::Opaque {
            area_m2,
            pitch_deg,
            is_unheated_pitched_roof,
            solar_absorption_coeff,
            thermal_resistance_construction,
            areal_heat_capacity_j_per_m2k,
            mass_distribution,
            orientation_deg,
            base_height_m,
            height_m,
            width_m,
        } => BuildingElement::Opaque(OpaqueElement::new(
            *area_m2,
            *is_unheated_pitched_roof,
            *pitch_deg,
            *solar_absorption_coeff,
            *thermal_resistance_construction,
            *areal_heat_capacity_j_per_m2k,
            *mass_distribution,
            *orientation_deg,
            *base_height_m,
            *height_m,
            *width_m,
        )?),
        BuildingElementDef::AdjacentConditioned {
            area_m2,
            pitch_deg,
            thermal_resistance_construction,
            areal_heat_capacity_j_per_m2k,
            mass_distribution,
        } => BuildingElement::AdjacentConditioned(AdjacentConditionedElement::new(
            *area_m2,
            *pitch_deg,
            *thermal_resistance_construction,
            *areal_heat_capacity_j_per_m2k,
            *mass_distribution,
        )?),
        BuildingElementDef::AdjacentUnconditioned {
            area_m2,
            pitch_deg,
            thermal_resistance_construction,
            thermal_resistance_unconditioned,
            areal_heat_capacity_j_per_m2k,
            mass_distribution,
        } => BuildingElement::AdjacentUnconditioned(AdjacentUnconditionedElement::new(
            *area_m2,
            *pitch_deg,
            *thermal_resistance_construction,
            *thermal_resistance_unconditioned,
            *areal_heat_capacity_j_per_m2k,
            *mass_distribution,
        )?),
        BuildingElementDef::Ground {
            total_area_m2,
            area_m2,
            pitch_deg,
            u_value,
            thermal_resistance_floor,
            areal_heat_capacity_j_per_m2k,
            mass_distribution,
            floor,
            wall_thickness_m,
            perimeter_m,
            psi_wall_floor_junction,
        } => BuildingElement::Ground(GroundElement::new(
            *total_area_m2,
            *area_m2,
            *pitch_deg,
            *u_value,
            *thermal_resistance_floor,
            *areal_heat_capacity_j_per_m2k,
            *mass_distribution,
            floor,
            *wall_thickness_m,
            *perimeter_m,
            *psi_wall_floor_junction,
            conditions,
        )?),
        BuildingElementDef::Transparent {
            pitch_deg,
            thermal_resistance_construction,
            orientation_deg,
            g_value,
            frame_area_fraction,
            base_height_m,
            height_m,
            width_m,
            shading,
        } => BuildingElement::Transparent(TransparentElement::new(
            *pitch_deg,
            *thermal_resistance_construction,
            *orientation_deg,
            *g_value,
            *frame_area_fraction,
            *base_height_m,
            *height_m,
            *width_m,
            shading,
        )?),
    };
    Ok(element)
}

fn build_ventilation(
    vent_def: &InfiltrationVentilationDef,
    zone_volume: Real,
) -> ProjectResult<VentilationModel> {
    let mut windows = Vec::with_capacity(vent_def.windows.len());
    for window_def in &vent_def.windows {
        let control = window_def.control.as_ref().map(onoff_control).transpose()?;
        windows.push(Window::new(
            window_def.free_area_height_m,
            window_def.mid_height_m,
            window_def.max_free_area_m2,
            window_def.parts,
            window_def.orientation_deg,
            window_def.pitch_deg,
            control,
        )?);
    }

    let mut vents = Vec::with_capacity(vent_def.vents.len());
    for v in &vent_def.vents {
        vents.push(Vent::new(
            v.mid_height_m,
            v.equivalent_area_cm2,
            v.ref_pressure_difference_pa,
            v.orientation_deg,
            v.pitch_deg,
        )?);
    }

    let leaks = build_leaks(vent_def)?;

    let mut mech_vents = Vec::with_capacity(vent_def.mechanical.len());
    for mech_def in &vent_def.mechanical {
        let control = mech_def.control.as_ref().map(onoff_control).transpose()?;
        mech_vents.push(MechanicalVentilation::new(
            mech_def.duty,
            mech_def.design_flow_rate_m3_per_h,
            mech_def.heat_recovery_efficiency,
            control,
        )?);
    }

    let mut combustion_appliances = Vec::with_capacity(vent_def.combustion_appliances.len());
    for appliance_def in &vent_def.combustion_appliances {
        let control = appliance_def
            .control
            .as_ref()
            .map(onoff_control)
            .transpose()?;
        combustion_appliances.push(CombustionAppliance::new(
            appliance_def.air_supply,
            appliance_def.exhaust,
            appliance_def.fuel,
            appliance_def.appliance,
            appliance_def.heat_input_kw,
            control,
        )?);
    }

    let network = VentilationNetwork::new(
        vent_def.cross_ventilation,
        vent_def.shield_class,
        vent_def.terrain_class,
        vent_def.altitude_m,
        zone_volume,
        windows,
        vents,
        leaks,
        mech_vents,
        combustion_appliances,
    )?;

    Ok(VentilationModel {
        network,
        ach_min_target: vent_def.ach_min_target,
        ach_max_target: vent_def.ach_max_target,
        vent_opening_ratio_init: vent_def.vent_opening_ratio_init,
    })
}

fn build_leaks(vent_def: &InfiltrationVentilationDef) -> ProjectResult<Vec<Leak>> {
    let leakage = &vent_def.leakage;
    let mut leaks = Vec::new();

    if leakage.area_facades_m2 > 0.0 {
        for direction in [FacadeDirection::Windward, FacadeDirection::Leeward] {
            leaks.push(Leak::new(
                vent_def.ventilation_zone_height_m / 2.0,
                leakage.test_pressure_pa,
                leakage.test_result_qv_per_m2,
                direction,
                leakage.env_area_m2,
                leakage.area_facades_m2,
                leakage.area_roof_m2,
            )?);
        }
    }

    if leakage.area_roof_m2 > 0.0 {
        // flat-roof band when cross ventilation applies
        let direction = if vent_def.cross_ventilation {
            FacadeDirection::Roof10
        } else {
            FacadeDirection::Roof
        };
        leaks.push(Leak::new(
            vent_def.ventilation_zone_height_m,
            leakage.test_pressure_pa,
            leakage.test_result_qv_per_m2,
            direction,
            leakage.env_area_m2,
            leakage.area_facades_m2,
            leakage.area_roof_m2,
        )?);
    }

    Ok(leaks)
}

fn onoff_control(schedule: &OnOffScheduleDef) -> ProjectResult<OnOffTimeControl> {
    Ok(OnOffTimeControl::new(
        schedule.values.clone(),
        schedule.start_day,
        schedule.step_hours,
    )?)
}

fn setpoint_control(schedule: &SetpointScheduleDef) -> ProjectResult<SetpointTimeControl> {
    Ok(SetpointTimeControl::new(
        schedule.setpoints_c.clone(),
        schedule.start_day,
        schedule.step_hours,
        schedule.setpoint_min_c,
        schedule.setpoint_max_c,
        schedule.default_to_max,
        schedule.advanced_start_hours,
    )?)
}
