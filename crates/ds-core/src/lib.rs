//! ds-core: stable foundation for dwellsim.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - rootfind (bounded bisection shared by all nonlinear solves)
//! - air (moist-air property helpers and reference constants)
//! - timing (simulation calendar iterator)
//! - error (shared error types)

pub mod air;
pub mod error;
pub mod numeric;
pub mod rootfind;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use rootfind::{RootConfig, solve_root};
pub use timing::{SimulationTime, SimulationTimeIteration};
pub use units::*;
