//! Infiltration and ventilation: the pressure-driven airflow network of a
//! dwelling zone.
//!
//! Every envelope opening is an orifice-law path whose flow follows
//! `sign(dp) * |dp|^n`; the pressure difference at each path combines wind
//! pressure on its facade, the stack effect of its height, and the zone's
//! internal reference pressure. Mechanical ventilation and combustion
//! appliances contribute fixed flows into the same balance. The reference
//! pressure is found per timestep by closing the mass balance over all paths
//! with the shared bisection solver.

pub mod error;
pub mod network;
pub mod paths;
pub mod wind;

pub use error::{AirflowError, AirflowResult};
pub use network::{
    AirFlows, ResolvedNetwork, VentilationNetwork, ventilation_heat_loss_coefficient,
};
pub use paths::{
    CombustionAirSupply, CombustionAppliance, CombustionApplianceKind, CombustionFuel,
    FlueGasExhaust, Leak, MechanicalVentilation, Vent, VentilationDuty, Window,
};
pub use wind::{FacadeDirection, TerrainClass, VentilationShieldClass};
