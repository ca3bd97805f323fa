//! Per-timestep output series recorded during a run.

use ds_core::Real;
use serde::Serialize;

/// Series recorded for one zone, one entry per timestep.
#[derive(Clone, Debug, Serialize)]
pub struct ZoneSeries {
    pub id: String,
    pub air_temp_c: Vec<Real>,
    pub operative_temp_c: Vec<Real>,
    /// Heating need to hold the setpoint, kWh.
    pub heat_demand_kwh: Vec<Real>,
    /// Cooling need, kWh (negative).
    pub cool_demand_kwh: Vec<Real>,
    /// Energy the heat source actually delivered, kWh.
    pub heat_delivered_kwh: Vec<Real>,
    /// Fabric transmission loss at the committed air temperature, W.
    pub fabric_loss_w: Vec<Real>,
    /// Ventilation heat loss at the committed air temperature, W.
    pub vent_loss_w: Vec<Real>,
}

impl ZoneSeries {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            air_temp_c: Vec::new(),
            operative_temp_c: Vec::new(),
            heat_demand_kwh: Vec::new(),
            cool_demand_kwh: Vec::new(),
            heat_delivered_kwh: Vec::new(),
            fabric_loss_w: Vec::new(),
            vent_loss_w: Vec::new(),
        }
    }
}

/// Full-run output: dwelling-level series plus one block per zone.
#[derive(Clone, Debug, Serialize)]
pub struct RunResults {
    /// Hour of year at the start of each timestep.
    pub timestamps_h: Vec<Real>,
    /// Dwelling air change rate delivered by the ventilation network, 1/h.
    pub ach: Vec<Real>,
    /// Converged internal reference pressure, Pa.
    pub internal_pressure_pa: Vec<Real>,
    pub zones: Vec<ZoneSeries>,
}

impl RunResults {
    pub(crate) fn new(zone_ids: impl Iterator<Item = String>) -> Self {
        Self {
            timestamps_h: Vec::new(),
            ach: Vec::new(),
            internal_pressure_pa: Vec::new(),
            zones: zone_ids.map(ZoneSeries::new).collect(),
        }
    }

    /// Number of recorded timesteps.
    pub fn len(&self) -> usize {
        self.timestamps_h.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_h.is_empty()
    }
}
