//! Dwelling document validation logic.

use crate::schema::{
    BuildingElementDef, Dwelling, ExternalConditionsDef, GainsScheduleDef,
    InfiltrationVentilationDef, OnOffScheduleDef, SetpointScheduleDef, ZoneDef,
};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_dwelling(dwelling: &Dwelling) -> Result<(), ValidationError> {
    if dwelling.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: dwelling.version,
        });
    }

    let time = &dwelling.simulation_time;
    if !(time.step_hours > 0.0) {
        return Err(invalid(
            "simulation_time.step_hours",
            time.step_hours,
            "must be positive",
        ));
    }
    if !(time.end_hour > time.start_hour) {
        return Err(invalid(
            "simulation_time.end_hour",
            time.end_hour,
            "must come after start_hour",
        ));
    }

    validate_external_conditions(&dwelling.external_conditions)?;

    let mut zone_ids = HashSet::new();
    for zone in &dwelling.zones {
        if !zone_ids.insert(&zone.id) {
            return Err(ValidationError::DuplicateId {
                id: zone.id.clone(),
                context: "zones".to_string(),
            });
        }
        validate_zone(zone)?;
    }

    validate_ventilation(&dwelling.infiltration_ventilation)?;

    Ok(())
}

fn validate_external_conditions(conditions: &ExternalConditionsDef) -> Result<(), ValidationError> {
    if !(conditions.time_series_step_hours > 0.0) {
        return Err(invalid(
            "external_conditions.time_series_step_hours",
            conditions.time_series_step_hours,
            "must be positive",
        ));
    }

    let n = conditions.air_temps_c.len();
    if n == 0 {
        return Err(invalid(
            "external_conditions.air_temps_c",
            0.0,
            "weather series must not be empty",
        ));
    }
    let lengths = [
        ("wind_speeds_m_per_s", conditions.wind_speeds_m_per_s.len()),
        (
            "wind_directions_deg",
            conditions.wind_directions_deg.len(),
        ),
        (
            "diffuse_horizontal_radiation_w_per_m2",
            conditions.diffuse_horizontal_radiation_w_per_m2.len(),
        ),
        (
            "direct_beam_radiation_w_per_m2",
            conditions.direct_beam_radiation_w_per_m2.len(),
        ),
        ("ground_reflectivity", conditions.ground_reflectivity.len()),
    ];
    for (field, len) in lengths {
        if len != n {
            return Err(ValidationError::InvalidValue {
                field: format!("external_conditions.{field}"),
                value: len.to_string(),
                reason: format!("length must match air_temps_c ({n})"),
            });
        }
    }

    for &reflectivity in &conditions.ground_reflectivity {
        if !(0.0..=1.0).contains(&reflectivity) {
            return Err(invalid(
                "external_conditions.ground_reflectivity",
                reflectivity,
                "must lie in [0, 1]",
            ));
        }
    }
    if !(-90.0..=90.0).contains(&conditions.latitude_deg) {
        return Err(invalid(
            "external_conditions.latitude_deg",
            conditions.latitude_deg,
            "must lie in [-90, 90]",
        ));
    }
    if !(-180.0..=180.0).contains(&conditions.longitude_deg) {
        return Err(invalid(
            "external_conditions.longitude_deg",
            conditions.longitude_deg,
            "must lie in [-180, 180]",
        ));
    }

    Ok(())
}

fn validate_zone(zone: &ZoneDef) -> Result<(), ValidationError> {
    let context = format!("zone '{}'", zone.id);

    if !(zone.area_m2 > 0.0) {
        return Err(invalid_in(&context, "area_m2", zone.area_m2, "must be positive"));
    }
    if !(zone.volume_m3 > 0.0) {
        return Err(invalid_in(
            &context,
            "volume_m3",
            zone.volume_m3,
            "must be positive",
        ));
    }

    for element in &zone.building_elements {
        validate_element(element, &context)?;
    }

    if let Some(heater) = &zone.heating {
        if !(heater.rated_power_kw > 0.0) {
            return Err(invalid_in(
                &context,
                "heating.rated_power_kw",
                heater.rated_power_kw,
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&heater.frac_convective) {
            return Err(invalid_in(
                &context,
                "heating.frac_convective",
                heater.frac_convective,
                "must lie in [0, 1]",
            ));
        }
        validate_setpoint_schedule(&heater.setpoints, &context)?;
    }
    if let Some(schedule) = &zone.cooling_setpoints {
        validate_setpoint_schedule(schedule, &context)?;
    }
    if let Some(schedule) = &zone.vent_cooling_setpoints {
        validate_setpoint_schedule(schedule, &context)?;
    }
    if let Some(gains) = &zone.internal_gains {
        validate_gains_schedule(gains, &context)?;
    }

    Ok(())
}

fn validate_element(element: &BuildingElementDef, context: &str) -> Result<(), ValidationError> {
    let (area, pitch) = match element {
        BuildingElementDef::Opaque {
            area_m2, pitch_deg, ..
        }
        | BuildingElementDef::AdjacentConditioned {
            area_m2, pitch_deg, ..
        }
        | BuildingElementDef::AdjacentUnconditioned {
            area_m2, pitch_deg, ..
        }
        | BuildingElementDef::Ground {
            area_m2, pitch_deg, ..
        } => (*area_m2, *pitch_deg),
        BuildingElementDef::Transparent {
            pitch_deg,
            height_m,
            width_m,
            g_value,
            frame_area_fraction,
            ..
        } => {
            if !(0.0..=1.0).contains(g_value) {
                return Err(invalid_in(context, "g_value", *g_value, "must lie in [0, 1]"));
            }
            if !(0.0..1.0).contains(frame_area_fraction) {
                return Err(invalid_in(
                    context,
                    "frame_area_fraction",
                    *frame_area_fraction,
                    "must lie in [0, 1)",
                ));
            }
            (height_m * width_m, *pitch_deg)
        }
    };

    if !(area > 0.0) {
        return Err(invalid_in(context, "element area", area, "must be positive"));
    }
    if !(0.0..=180.0).contains(&pitch) {
        return Err(invalid_in(
            context,
            "pitch_deg",
            pitch,
            "must lie in [0, 180]",
        ));
    }

    Ok(())
}

fn validate_ventilation(vent: &InfiltrationVentilationDef) -> Result<(), ValidationError> {
    let context = "infiltration_ventilation";

    if !(vent.ventilation_zone_height_m > 0.0) {
        return Err(invalid_in(
            context,
            "ventilation_zone_height_m",
            vent.ventilation_zone_height_m,
            "must be positive",
        ));
    }
    if !(0.0..=1.0).contains(&vent.vent_opening_ratio_init) {
        return Err(invalid_in(
            context,
            "vent_opening_ratio_init",
            vent.vent_opening_ratio_init,
            "must lie in [0, 1]",
        ));
    }
    if let (Some(lo), Some(hi)) = (vent.ach_min_target, vent.ach_max_target) {
        if lo > hi {
            return Err(invalid_in(
                context,
                "ach_min_target",
                lo,
                "must not exceed ach_max_target",
            ));
        }
    }

    for window in &vent.windows {
        if window.parts == 0 {
            return Err(invalid_in(
                context,
                "window parts",
                0.0,
                "a window needs at least one part",
            ));
        }
        if let Some(control) = &window.control {
            validate_onoff_schedule(control, context)?;
        }
    }

    let leakage = &vent.leakage;
    if !(leakage.test_pressure_pa > 0.0) {
        return Err(invalid_in(
            context,
            "leakage.test_pressure_pa",
            leakage.test_pressure_pa,
            "must be positive",
        ));
    }
    if !(leakage.area_facades_m2 + leakage.area_roof_m2 > 0.0) {
        return Err(invalid_in(
            context,
            "leakage.area_facades_m2",
            leakage.area_facades_m2,
            "facade and roof areas must not both be zero",
        ));
    }

    for mech in &vent.mechanical {
        if let Some(control) = &mech.control {
            validate_onoff_schedule(control, context)?;
        }
    }
    for appliance in &vent.combustion_appliances {
        if let Some(control) = &appliance.control {
            validate_onoff_schedule(control, context)?;
        }
    }

    Ok(())
}

fn validate_setpoint_schedule(
    schedule: &SetpointScheduleDef,
    context: &str,
) -> Result<(), ValidationError> {
    if schedule.setpoints_c.is_empty() {
        return Err(invalid_in(
            context,
            "setpoints_c",
            0.0,
            "schedule must not be empty",
        ));
    }
    if !(schedule.step_hours > 0.0) {
        return Err(invalid_in(
            context,
            "step_hours",
            schedule.step_hours,
            "must be positive",
        ));
    }
    if !(schedule.advanced_start_hours >= 0.0) {
        return Err(invalid_in(
            context,
            "advanced_start_hours",
            schedule.advanced_start_hours,
            "must not be negative",
        ));
    }
    Ok(())
}

fn validate_onoff_schedule(
    schedule: &OnOffScheduleDef,
    context: &str,
) -> Result<(), ValidationError> {
    if schedule.values.is_empty() {
        return Err(invalid_in(
            context,
            "schedule values",
            0.0,
            "schedule must not be empty",
        ));
    }
    if !(schedule.step_hours > 0.0) {
        return Err(invalid_in(
            context,
            "step_hours",
            schedule.step_hours,
            "must be positive",
        ));
    }
    Ok(())
}

fn validate_gains_schedule(
    schedule: &GainsScheduleDef,
    context: &str,
) -> Result<(), ValidationError> {
    if schedule.values_w.is_empty() {
        return Err(invalid_in(
            context,
            "values_w",
            0.0,
            "schedule must not be empty",
        ));
    }
    if !(schedule.step_hours > 0.0) {
        return Err(invalid_in(
            context,
            "step_hours",
            schedule.step_hours,
            "must be positive",
        ));
    }
    Ok(())
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn invalid_in(context: &str, field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: format!("{context} {field}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::*;

    fn minimal_dwelling() -> Dwelling {
        Dwelling {
            version: LATEST_VERSION,
            name: "Test dwelling".to_string(),
            simulation_time: SimulationTimeDef {
                start_hour: 0.0,
                end_hour: 8.0,
                step_hours: 1.0,
            },
            external_conditions: ExternalConditionsDef {
                air_temps_c: vec![5.0; 8],
                wind_speeds_m_per_s: vec![4.0; 8],
                wind_directions_deg: vec![180.0; 8],
                diffuse_horizontal_radiation_w_per_m2: vec![0.0; 8],
                direct_beam_radiation_w_per_m2: vec![0.0; 8],
                ground_reflectivity: vec![0.2; 8],
                time_series_step_hours: 1.0,
                direct_beam_conversion_needed: false,
                latitude_deg: 51.5,
                longitude_deg: -0.1,
                timezone_hours: 0.0,
                leap_year: false,
                shading_segments: vec![],
            },
            zones: vec![],
            infiltration_ventilation: InfiltrationVentilationDef {
                cross_ventilation: false,
                shield_class: ds_airflow::VentilationShieldClass::Normal,
                terrain_class: ds_airflow::TerrainClass::OpenTerrain,
                altitude_m: 0.0,
                ventilation_zone_height_m: 5.0,
                ach_min_target: None,
                ach_max_target: None,
                vent_opening_ratio_init: 1.0,
                windows: vec![],
                vents: vec![],
                leakage: LeakageDef {
                    test_pressure_pa: 50.0,
                    test_result_qv_per_m2: 5.0,
                    env_area_m2: 220.0,
                    area_facades_m2: 120.0,
                    area_roof_m2: 60.0,
                },
                mechanical: vec![],
                combustion_appliances: vec![],
            },
        }
    }

    fn test_zone(id: &str) -> ZoneDef {
        ZoneDef {
            id: id.to_string(),
            area_m2: 40.0,
            volume_m3: 100.0,
            setpoint_basis: ds_zone::SetpointBasis::Air,
            temp_setpnt_init_c: 20.0,
            building_elements: vec![],
            thermal_bridging: ThermalBridgingDef::default(),
            heating: None,
            cooling_setpoints: None,
            vent_cooling_setpoints: None,
            internal_gains: None,
        }
    }

    #[test]
    fn minimal_dwelling_validates() {
        validate_dwelling(&minimal_dwelling()).unwrap();
    }

    #[test]
    fn rejects_future_version() {
        let mut dwelling = minimal_dwelling();
        dwelling.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_dwelling(&dwelling),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_zone_ids() {
        let mut dwelling = minimal_dwelling();
        dwelling.zones = vec![test_zone("living"), test_zone("living")];
        assert!(matches!(
            validate_dwelling(&dwelling),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_weather_series() {
        let mut dwelling = minimal_dwelling();
        dwelling.external_conditions.wind_speeds_m_per_s.pop();
        assert!(validate_dwelling(&dwelling).is_err());
    }

    #[test]
    fn rejects_out_of_range_pitch() {
        let mut dwelling = minimal_dwelling();
        let mut zone = test_zone("living");
        zone.building_elements.push(BuildingElementDef::Opaque {
            area_m2: 20.0,
            pitch_deg: 200.0,
            is_unheated_pitched_roof: false,
            solar_absorption_coeff: 0.6,
            thermal_resistance_construction: 1.5,
            areal_heat_capacity_j_per_m2k: 19_000.0,
            mass_distribution: ds_fabric::MassDistributionClass::I,
            orientation_deg: 0.0,
            base_height_m: 0.0,
            height_m: 4.0,
            width_m: 5.0,
        });
        dwelling.zones = vec![zone];
        assert!(validate_dwelling(&dwelling).is_err());
    }

    #[test]
    fn rejects_inverted_ach_band() {
        let mut dwelling = minimal_dwelling();
        dwelling.infiltration_ventilation.ach_min_target = Some(4.0);
        dwelling.infiltration_ventilation.ach_max_target = Some(2.0);
        assert!(validate_dwelling(&dwelling).is_err());
    }

    #[test]
    fn rejects_empty_heating_schedule() {
        let mut dwelling = minimal_dwelling();
        let mut zone = test_zone("living");
        zone.heating = Some(HeaterDef {
            rated_power_kw: 3.0,
            frac_convective: 0.4,
            setpoints: SetpointScheduleDef {
                setpoints_c: vec![],
                start_day: 0,
                step_hours: 1.0,
                setpoint_min_c: None,
                setpoint_max_c: None,
                default_to_max: false,
                advanced_start_hours: 0.0,
            },
        });
        dwelling.zones = vec![zone];
        assert!(validate_dwelling(&dwelling).is_err());
    }
}
