//! The seam between the zone heat balance and whatever supplies heat to it.

use ds_core::units::convert::{kwh_to_watts, watts_to_kwh};
use ds_core::units::{Energy, Power, kwh};
use ds_core::{Real, SimulationTimeIteration};
use ds_controls::SetpointTimeControl;
use uom::si::power::watt;

/// A heat source serving a zone.
///
/// The run loop calls `energy_output_max` and `demand_energy` while working
/// out a timestep, then `timestep_end` exactly once per timestep after all
/// demand calls, so implementations can settle internal state (tank
/// temperatures, runtime counters) knowing no further demand will arrive.
pub trait HeatEmitter {
    /// Maximum energy the emitter could deliver this timestep, kWh.
    fn energy_output_max(&self, temp_int_air: Real, it: &SimulationTimeIteration) -> Real;

    /// Ask the emitter to deliver `energy_demand` kWh; returns what it
    /// actually delivered (possibly less).
    fn demand_energy(&mut self, energy_demand: Real, it: &SimulationTimeIteration) -> Real;

    /// Convective fraction of the delivered heat.
    fn frac_convective(&self) -> Real;

    /// End-of-timestep settlement. Called exactly once per timestep.
    fn timestep_end(&mut self, it: &SimulationTimeIteration);
}

/// A direct-acting heater: converts demand into output immediately, limited
/// only by its rated power and its control schedule.
pub struct DirectHeater {
    rated_power: Power,
    frac_convective: Real,
    control: Option<SetpointTimeControl>,
    energy_supplied_kwh: Real,
}

impl DirectHeater {
    pub fn new(
        rated_power: Power,
        frac_convective: Real,
        control: Option<SetpointTimeControl>,
    ) -> Self {
        Self {
            rated_power,
            frac_convective,
            control,
            energy_supplied_kwh: 0.0,
        }
    }

    fn available(&self, it: &SimulationTimeIteration) -> bool {
        match &self.control {
            Some(control) => control.is_on(it),
            None => true,
        }
    }

    /// Cumulative energy delivered since construction.
    pub fn energy_supplied(&self) -> Energy {
        kwh(self.energy_supplied_kwh)
    }
}

impl HeatEmitter for DirectHeater {
    fn energy_output_max(&self, _temp_int_air: Real, it: &SimulationTimeIteration) -> Real {
        if self.available(it) {
            watts_to_kwh(self.rated_power.get::<watt>(), it.timestep)
        } else {
            0.0
        }
    }

    fn demand_energy(&mut self, energy_demand: Real, it: &SimulationTimeIteration) -> Real {
        let delivered = energy_demand
            .max(0.0)
            .min(self.energy_output_max(0.0, it));
        self.energy_supplied_kwh += delivered;
        delivered
    }

    fn frac_convective(&self) -> Real {
        self.frac_convective
    }

    fn timestep_end(&mut self, _it: &SimulationTimeIteration) {}
}

/// Average power in W corresponding to energy delivered over the timestep.
pub fn delivered_power_w(energy_kwh: Real, it: &SimulationTimeIteration) -> Real {
    kwh_to_watts(energy_kwh, it.timestep)
}
