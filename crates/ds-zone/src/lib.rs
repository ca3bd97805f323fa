//! Zone heat balance: the ISO 52016-1 nodal model tying the fabric,
//! ventilation and heat emission together for one thermal zone.

pub mod emitter;
pub mod error;
pub mod zone;

pub use emitter::{DirectHeater, HeatEmitter, delivered_power_w};
pub use error::{ZoneError, ZoneResult};
pub use zone::{
    AirChangesPerHour, SetpointBasis, SpaceHeatCoolDemand, ThermalBridging, Zone,
    vent_heat_transfer_coeff,
};
