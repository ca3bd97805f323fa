//! Geometric equivalence of reveal shading and its overhang + side fin
//! decomposition.

use ds_climate::{
    ExternalConditions, ShadingSegment, SiteGeometry, WeatherSeries, WindowShading,
};
use ds_core::SimulationTime;

fn conditions_for_day() -> (SimulationTime, ExternalConditions) {
    let time = SimulationTime::new(0.0, 24.0, 1.0).unwrap();
    let n = 24;
    let weather = WeatherSeries {
        air_temps: vec![10.0; n],
        wind_speeds: vec![4.0; n],
        wind_directions: vec![200.0; n],
        diffuse_horizontal_radiation: vec![120.0; n],
        direct_beam_radiation: vec![450.0; n],
        ground_reflectivity: vec![0.2; n],
        time_series_step: 1.0,
        direct_beam_conversion_needed: false,
    };
    let site = SiteGeometry {
        latitude: 51.5,
        longitude: -0.1,
        timezone: 0.0,
        leap_year: false,
        shading_segments: vec![
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
        ],
    };
    let conditions = ExternalConditions::new(&time, weather, site).unwrap();
    (time, conditions)
}

#[test]
fn reveal_equals_overhang_plus_two_side_fins() {
    let (time, conditions) = conditions_for_day();

    let reveal = [WindowShading::Reveal {
        depth: 0.25,
        distance: 0.1,
    }];
    let decomposed = [
        WindowShading::Overhang {
            depth: 0.25,
            distance: 0.1,
        },
        WindowShading::SideFinLeft {
            depth: 0.25,
            distance: 0.1,
        },
        WindowShading::SideFinRight {
            depth: 0.25,
            distance: 0.1,
        },
    ];

    for it in time.iter() {
        let (fdir_reveal, fdiff_reveal) = conditions
            .shading_reduction_factor_direct_diffuse(1.0, 1.25, 1.0, 90.0, 0.0, &reveal, &it)
            .unwrap();
        let (fdir_decomp, fdiff_decomp) = conditions
            .shading_reduction_factor_direct_diffuse(1.0, 1.25, 1.0, 90.0, 0.0, &decomposed, &it)
            .unwrap();
        assert_eq!(fdir_reveal, fdir_decomp, "direct factor at hour {}", it.index);
        assert_eq!(
            fdiff_reveal, fdiff_decomp,
            "diffuse factor at hour {}",
            it.index
        );
    }
}

#[test]
fn shading_factors_stay_in_unit_interval() {
    let (time, conditions) = conditions_for_day();
    let shading = [WindowShading::Reveal {
        depth: 0.4,
        distance: 0.05,
    }];
    for it in time.iter() {
        let (fdir, fdiff) = conditions
            .shading_reduction_factor_direct_diffuse(1.0, 1.25, 1.0, 90.0, 0.0, &shading, &it)
            .unwrap();
        assert!((0.0..=1.0).contains(&fdir), "fdir={fdir}");
        assert!((0.0..=1.0).contains(&fdiff), "fdiff={fdiff}");
    }
}
