//! Whole-zone behavior: a single insulated wall under stepped external
//! temperatures, checking the fabric loss coefficient stays fixed while the
//! heating need shrinks as outside warms up.

use ds_climate::{ExternalConditions, SiteGeometry, WeatherSeries};
use ds_core::{Real, SimulationTime};
use ds_fabric::surface::{R_SE, r_si_for_pitch};
use ds_fabric::{BuildingElement, MassDistributionClass, OpaqueElement};
use ds_zone::{AirChangesPerHour, SetpointBasis, ThermalBridging, Zone};

fn flat_conditions(time: &SimulationTime, temp: Real) -> ExternalConditions {
    let n = time.end().ceil() as usize;
    ExternalConditions::new(
        time,
        WeatherSeries {
            air_temps: vec![temp; n],
            wind_speeds: vec![3.0; n],
            wind_directions: vec![180.0; n],
            diffuse_horizontal_radiation: vec![0.0; n],
            direct_beam_radiation: vec![0.0; n],
            ground_reflectivity: vec![0.2; n],
            time_series_step: 1.0,
            direct_beam_conversion_needed: false,
        },
        SiteGeometry {
            latitude: 51.5,
            longitude: -0.1,
            timezone: 0.0,
            leap_year: false,
            shading_segments: vec![],
        },
    )
    .unwrap()
}

/// 20 m^2 floor-facing wall with an overall U-value of 0.60 W/(m^2 K).
fn u060_wall() -> BuildingElement {
    let pitch = 180.0;
    let u_value = 0.60;
    let r_c = 1.0 / u_value - r_si_for_pitch(pitch) - R_SE;
    BuildingElement::Opaque(
        OpaqueElement::new(
            20.0,
            false,
            pitch,
            0.6,
            r_c,
            19_000.0,
            MassDistributionClass::I,
            0.0,
            0.0,
            4.0,
            5.0,
        )
        .unwrap(),
    )
}

fn zone_at(temp_ext: Real) -> (Zone, ExternalConditions, SimulationTime) {
    let time = SimulationTime::new(0.0, 4.0, 1.0).unwrap();
    let conditions = flat_conditions(&time, temp_ext);
    let it = time.iter().next().unwrap();
    let zone = Zone::new(
        20.0,
        50.0,
        vec![u060_wall()],
        ThermalBridging::Coefficient(0.0),
        temp_ext,
        20.0,
        SetpointBasis::Air,
        None,
        &conditions,
        &it,
    )
    .unwrap();
    (zone, conditions, time)
}

#[test]
fn fabric_loss_coefficient_recovers_the_declared_u_value() {
    let (zone, _, _) = zone_at(0.0);
    // 20 m^2 at U = 0.60 gives 12 W/K, independent of weather
    assert!((zone.total_fabric_heat_loss() - 12.0).abs() < 1e-9);
}

#[test]
fn heating_demand_falls_as_outside_warms() {
    let mut demands = Vec::new();
    for temp_ext in [0.0, 5.0, 10.0, 15.0] {
        let (zone, conditions, time) = zone_at(temp_ext);
        let it = time.iter().next().unwrap();
        let demand = zone
            .space_heat_cool_demand(
                1.0,
                temp_ext,
                0.0,
                0.0,
                0.4,
                0.4,
                20.0,
                25.0,
                temp_ext,
                AirChangesPerHour::Cooling { ach_cooling: 0.5 },
                &conditions,
                &it,
            )
            .unwrap();
        // fabric loss coefficient unaffected by the boundary temperature
        assert!((zone.total_fabric_heat_loss() - 12.0).abs() < 1e-9);
        demands.push(demand.space_heat_demand);
    }

    for pair in demands.windows(2) {
        assert!(
            pair[0] > pair[1],
            "demand did not fall: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn identical_zones_evolve_identically() {
    let (mut zone_a, conditions, time) = zone_at(5.0);
    let (mut zone_b, _, _) = zone_at(5.0);

    for it in time.iter() {
        zone_a
            .update_temperatures(
                3600.0, 5.0, 100.0, 0.0, 0.0, 0.4, 0.5, 5.0, &conditions, &it,
            )
            .unwrap();
        zone_b
            .update_temperatures(
                3600.0, 5.0, 100.0, 0.0, 0.0, 0.4, 0.5, 5.0, &conditions, &it,
            )
            .unwrap();
        assert_eq!(zone_a.temp_internal_air(), zone_b.temp_internal_air());
        assert_eq!(zone_a.temp_operative(), zone_b.temp_operative());
    }
}
