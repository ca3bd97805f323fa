//! ds-climate: external conditions and solar geometry for dwellsim.
//!
//! Everything here is a pure function of the simulation timestep and static
//! site/surface geometry. The [`ExternalConditions`] object precomputes the
//! per-day and per-hour solar geometry series once at construction and is
//! read-only for the rest of the run.

pub mod conditions;
pub mod error;
pub mod geometry;
pub mod irradiance;
pub mod shading;

pub use conditions::{ExternalConditions, SiteGeometry, WeatherSeries};
pub use error::{ClimateError, ClimateResult};
pub use shading::{ShadingObject, ShadingObjectKind, ShadingSegment, WindowShading};
