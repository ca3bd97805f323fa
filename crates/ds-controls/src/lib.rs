//! Schedule-backed control collaborators for dwellsim.
//!
//! Controls are evaluated against the current simulation timestep only; the
//! schedules behind them are immutable time series constructed before the
//! run starts. Two kinds exist:
//! - on/off controls gate airflow paths (window/vent open flags);
//! - setpoint controls provide zone temperature setpoints and the
//!   "required period" flag the demand calculation keys off.

pub mod error;
pub mod onoff;
pub mod setpoint;

pub use error::{ControlError, ControlResult};
pub use onoff::OnOffTimeControl;
pub use setpoint::SetpointTimeControl;
