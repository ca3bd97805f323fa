//! The full-year run loop.
//!
//! Per timestep: solve the airflow network for the internal reference
//! pressure (warm-started from the previous step), evaluate each zone's
//! heating/cooling need, negotiate with the zone's heat source, commit the
//! node temperatures, then let every heat source settle exactly once.

use crate::error::{SimError, SimResult};
use crate::results::RunResults;
use ds_core::Real;
use ds_project::Model;
use ds_zone::{AirChangesPerHour, HeatEmitter, delivered_power_w, vent_heat_transfer_coeff};
use tracing::debug_span;

/// Heating setpoint substituted when no heating schedule demands one.
const TEMP_SETPNT_HEAT_NONE: Real = -273.15;
/// Cooling setpoint substituted when no cooling schedule demands one.
const TEMP_SETPNT_COOL_NONE: Real = 1.0e32;
/// Convective fraction assumed when no emitter supplies one.
const DEFAULT_FRAC_CONVECTIVE: Real = 0.4;

pub fn run_simulation(model: &mut Model) -> SimResult<RunResults> {
    if model.zones.is_empty() {
        return Err(SimError::InvalidArg {
            what: "a run needs at least one zone",
        });
    }

    let total_volume: Real = model.zones.iter().map(|zone| zone.zone.volume()).sum();
    let mut results = RunResults::new(model.zones.iter().map(|zone| zone.id.clone()));

    let mut p_z_guess = 0.0;
    let mut r_v_arg = model.ventilation.vent_opening_ratio_init;

    for it in model.simulation_time.iter() {
        let _span = debug_span!("timestep", index = it.index).entered();

        let temp_ext = model.conditions.air_temp(&it);
        let temp_int_avg = model
            .zones
            .iter()
            .map(|zone| zone.zone.temp_internal_air() * zone.zone.volume())
            .sum::<Real>()
            / total_volume;

        r_v_arg = model.ventilation.network.find_r_v_arg_within_bounds(
            &model.conditions,
            &it,
            model.ventilation.ach_min_target,
            model.ventilation.ach_max_target,
            r_v_arg,
            0.0,
            temp_int_avg,
            p_z_guess,
        )?;

        let resolved =
            model
                .ventilation
                .network
                .resolve(&model.conditions, &it, 0.0, r_v_arg, temp_int_avg)?;
        let p_z = resolved.internal_reference_pressure(p_z_guess)?;
        p_z_guess = p_z;
        let ach_target = resolved.air_change_rate(p_z, total_volume);
        let temp_supply = resolved.average_supply_temperature(p_z);

        let resolved_open =
            model
                .ventilation
                .network
                .resolve(&model.conditions, &it, 1.0, r_v_arg, temp_int_avg)?;
        let p_z_open = resolved_open.internal_reference_pressure(p_z)?;
        let ach_windows_open = resolved_open.air_change_rate(p_z_open, total_volume);

        for (zone_model, series) in model.zones.iter_mut().zip(results.zones.iter_mut()) {
            let gains_internal = zone_model.gains_internal_w(&it);
            let gains_solar = zone_model.zone.gains_solar(&model.conditions, &it)?;

            let temp_setpnt_heat = zone_model
                .heating_setpoints
                .as_ref()
                .and_then(|control| control.setpnt(&it))
                .unwrap_or(TEMP_SETPNT_HEAT_NONE);
            let temp_setpnt_cool = zone_model
                .cooling_setpoints
                .as_ref()
                .and_then(|control| control.setpnt(&it))
                .unwrap_or(TEMP_SETPNT_COOL_NONE);
            let frac_convective_heat = zone_model
                .heater
                .as_ref()
                .map(|heater| heater.frac_convective())
                .unwrap_or(DEFAULT_FRAC_CONVECTIVE);

            let demand = zone_model.zone.space_heat_cool_demand(
                it.timestep,
                temp_ext,
                gains_internal,
                gains_solar,
                frac_convective_heat,
                DEFAULT_FRAC_CONVECTIVE,
                temp_setpnt_heat,
                temp_setpnt_cool,
                temp_supply,
                AirChangesPerHour::TargetAndWindowsOpen {
                    ach_target,
                    ach_windows_open,
                },
                &model.conditions,
                &it,
            )?;

            let mut energy_delivered_kwh = 0.0;
            let mut frac_convective = frac_convective_heat;
            if demand.space_heat_demand > 0.0 {
                let temp_int_air = zone_model.zone.temp_internal_air();
                if let Some(heater) = &mut zone_model.heater {
                    let energy_max = heater.energy_output_max(temp_int_air, &it);
                    energy_delivered_kwh =
                        heater.demand_energy(demand.space_heat_demand.min(energy_max), &it);
                    frac_convective = heater.frac_convective();
                }
            } else if demand.space_cool_demand < 0.0 {
                // cooling is delivered ideally whenever a schedule asks for it
                energy_delivered_kwh = demand.space_cool_demand;
                frac_convective = DEFAULT_FRAC_CONVECTIVE;
            }
            let gains_heat_cool_w = delivered_power_w(energy_delivered_kwh, &it);

            zone_model.zone.update_temperatures(
                it.timestep * 3600.0,
                temp_ext,
                gains_internal,
                gains_solar,
                gains_heat_cool_w,
                frac_convective,
                demand.ach_cooling,
                temp_supply,
                &model.conditions,
                &it,
            )?;

            let temp_int = zone_model.zone.temp_internal_air();
            series.air_temp_c.push(temp_int);
            series.operative_temp_c.push(zone_model.zone.temp_operative());
            series.heat_demand_kwh.push(demand.space_heat_demand);
            series.cool_demand_kwh.push(demand.space_cool_demand);
            series.heat_delivered_kwh.push(energy_delivered_kwh.max(0.0));
            series
                .fabric_loss_w
                .push(zone_model.zone.total_fabric_heat_loss() * (temp_int - temp_ext));
            series.vent_loss_w.push(
                vent_heat_transfer_coeff(zone_model.zone.volume(), demand.ach_cooling)
                    * (temp_int - temp_supply),
            );
        }

        // every heat source settles exactly once, after all demand calls
        for zone_model in &mut model.zones {
            if let Some(heater) = &mut zone_model.heater {
                heater.timestep_end(&it);
            }
        }

        results.timestamps_h.push(it.current);
        results.ach.push(ach_target);
        results.internal_pressure_pa.push(p_z);
    }

    tracing::debug!(
        steps = results.len(),
        zones = results.zones.len(),
        "run complete"
    );
    Ok(results)
}

/// Total heating energy delivered across the run, kWh.
pub fn total_heat_delivered(results: &RunResults) -> Real {
    results
        .zones
        .iter()
        .map(|zone| zone.heat_delivered_kwh.iter().sum::<Real>())
        .sum()
}

/// Total heating need across the run, kWh.
pub fn total_heat_demand(results: &RunResults) -> Real {
    results
        .zones
        .iter()
        .map(|zone| zone.heat_demand_kwh.iter().sum::<Real>())
        .sum()
}
