//! End-to-end runs over a small heated dwelling.

use ds_project::schema::*;
use ds_project::{Model, build_model, validate_dwelling};
use ds_sim::{run_simulation, total_heat_delivered, total_heat_demand};

fn dwelling(air_temp_c: f64, hours: usize) -> Dwelling {
    Dwelling {
        version: LATEST_VERSION,
        name: "Run test".to_string(),
        simulation_time: SimulationTimeDef {
            start_hour: 0.0,
            end_hour: hours as f64,
            step_hours: 1.0,
        },
        external_conditions: ExternalConditionsDef {
            air_temps_c: vec![air_temp_c; hours],
            wind_speeds_m_per_s: vec![4.0; hours],
            wind_directions_deg: vec![180.0; hours],
            diffuse_horizontal_radiation_w_per_m2: vec![0.0; hours],
            direct_beam_radiation_w_per_m2: vec![0.0; hours],
            ground_reflectivity: vec![0.2; hours],
            time_series_step_hours: 1.0,
            direct_beam_conversion_needed: false,
            latitude_deg: 51.5,
            longitude_deg: -0.1,
            timezone_hours: 0.0,
            leap_year: false,
            shading_segments: vec![],
        },
        zones: vec![ZoneDef {
            id: "living".to_string(),
            area_m2: 40.0,
            volume_m3: 100.0,
            setpoint_basis: ds_zone::SetpointBasis::Air,
            temp_setpnt_init_c: 20.0,
            building_elements: vec![BuildingElementDef::Opaque {
                area_m2: 60.0,
                pitch_deg: 90.0,
                is_unheated_pitched_roof: false,
                solar_absorption_coeff: 0.6,
                thermal_resistance_construction: 1.5,
                areal_heat_capacity_j_per_m2k: 19_000.0,
                mass_distribution: ds_fabric::MassDistributionClass::I,
                orientation_deg: 180.0,
                base_height_m: 0.0,
                height_m: 3.0,
                width_m: 20.0,
            }],
            thermal_bridging: ThermalBridgingDef::Coefficient {
                heat_transfer_coefficient: 2.0,
            },
            heating: Some(HeaterDef {
                rated_power_kw: 10.0,
                frac_convective: 0.4,
                setpoints: SetpointScheduleDef {
                    setpoints_c: vec![Some(20.0); hours],
                    start_day: 0,
                    step_hours: 1.0,
                    setpoint_min_c: None,
                    setpoint_max_c: None,
                    default_to_max: false,
                    advanced_start_hours: 0.0,
                },
            }),
            cooling_setpoints: None,
            vent_cooling_setpoints: None,
            internal_gains: None,
        }],
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
                env_area_m2: 160.0,
                area_facades_m2: 120.0,
                area_roof_m2: 40.0,
            },
            mechanical: vec![],
            combustion_appliances: vec![],
        },
    }
}

fn model_for(air_temp_c: f64, hours: usize) -> Model {
    let dwelling = dwelling(air_temp_c, hours);
    validate_dwelling(&dwelling).unwrap();
    build_model(&dwelling).unwrap()
}

#[test]
fn records_one_entry_per_timestep() {
    let mut model = model_for(0.0, 6);
    let results = run_simulation(&mut model).unwrap();

    assert_eq!(results.len(), 6);
    assert_eq!(results.zones.len(), 1);
    let zone = &results.zones[0];
    assert_eq!(zone.air_temp_c.len(), 6);
    assert_eq!(zone.heat_demand_kwh.len(), 6);
    assert_eq!(results.ach.len(), 6);
}

#[test]
fn heated_zone_holds_near_the_setpoint_in_cold_weather() {
    let mut model = model_for(0.0, 12);
    let results = run_simulation(&mut model).unwrap();

    let zone = &results.zones[0];
    for (&temp, &demand) in zone.air_temp_c.iter().zip(&zone.heat_demand_kwh) {
        assert!(demand > 0.0, "cold weather must create heating demand");
        assert!(
            (temp - 20.0).abs() < 0.5,
            "air temperature {temp} strayed from the 20 C setpoint"
        );
    }
    assert!(total_heat_delivered(&results) > 0.0);
}

#[test]
fn mild_weather_needs_less_heat_than_cold_weather() {
    let mut cold = model_for(0.0, 12);
    let mut mild = model_for(15.0, 12);
    let demand_cold = total_heat_demand(&run_simulation(&mut cold).unwrap());
    let demand_mild = total_heat_demand(&run_simulation(&mut mild).unwrap());
    assert!(demand_cold > demand_mild);
}

#[test]
fn reruns_are_bit_identical() {
    let mut model_a = model_for(5.0, 8);
    let mut model_b = model_for(5.0, 8);
    let results_a = run_simulation(&mut model_a).unwrap();
    let results_b = run_simulation(&mut model_b).unwrap();

    assert_eq!(results_a.internal_pressure_pa, results_b.internal_pressure_pa);
    assert_eq!(results_a.ach, results_b.ach);
    assert_eq!(
        results_a.zones[0].air_temp_c,
        results_b.zones[0].air_temp_c
    );
    assert_eq!(
        results_a.zones[0].heat_demand_kwh,
        results_b.zones[0].heat_demand_kwh
    );
}

#[test]
fn heat_recovery_lowers_heating_demand() {
    let model_with_mvhr = |efficiency: f64| {
        let mut dwelling = dwelling(0.0, 12);
        dwelling
            .infiltration_ventilation
            .mechanical
            .push(MechanicalVentilationDef {
                duty: ds_airflow::VentilationDuty::Mvhr,
                design_flow_rate_m3_per_h: 150.0,
                heat_recovery_efficiency: efficiency,
                control: None,
            });
        validate_dwelling(&dwelling).unwrap();
        build_model(&dwelling).unwrap()
    };

    let demand_no_recovery = total_heat_demand(&run_simulation(&mut model_with_mvhr(0.0)).unwrap());
    let demand_recovered = total_heat_demand(&run_simulation(&mut model_with_mvhr(0.85)).unwrap());

    assert!(demand_no_recovery > 0.0);
    assert!(
        demand_recovered < demand_no_recovery,
        "recovering extract heat must cut demand ({demand_recovered} vs {demand_no_recovery} kWh)"
    );
}

#[test]
fn undersized_heater_delivers_no_more_than_its_rating() {
    let mut dwelling = dwelling(-5.0, 12);
    if let Some(heating) = &mut dwelling.zones[0].heating {
        heating.rated_power_kw = 0.5;
    }
    validate_dwelling(&dwelling).unwrap();
    let mut model = build_model(&dwelling).unwrap();
    let results = run_simulation(&mut model).unwrap();

    let zone = &results.zones[0];
    for (&delivered, &demand) in zone.heat_delivered_kwh.iter().zip(&zone.heat_demand_kwh) {
        assert!(delivered <= 0.5 + 1e-9);
        assert!(delivered <= demand + 1e-9);
    }
    // the cap binds, so the zone cannot hold the setpoint
    assert!(zone.air_temp_c.iter().any(|&temp| temp < 19.5));
}

#[test]
fn results_serialize_to_json() {
    let mut model = model_for(5.0, 4);
    let results = run_simulation(&mut model).unwrap();
    let json = serde_json::to_string(&results).unwrap();
    assert!(json.contains("\"air_temp_c\""));
}
