//! ds-sim: the full-year run loop tying the dwelling model together.

pub mod error;
pub mod results;
pub mod run;

pub use error::{SimError, SimResult};
pub use results::{RunResults, ZoneSeries};
pub use run::{run_simulation, total_heat_delivered, total_heat_demand};
