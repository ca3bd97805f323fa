//! Building fabric for dwellsim: the conduction network of a zone envelope.
//!
//! Each envelope surface is a [`BuildingElement`], a short ladder of
//! temperature nodes whose conductances and capacities depend on the
//! construction family (opaque, adjacent to conditioned or unconditioned
//! spaces, ground-coupled, transparent). Junction losses are modeled as
//! [`ThermalBridge`]s. The zone heat balance owns the node temperatures;
//! this crate describes the network they live on.

pub mod bridge;
pub mod element;
pub mod error;
pub mod ground;
pub mod surface;

pub use bridge::ThermalBridge;
pub use element::{
    AdjacentConditionedElement, AdjacentUnconditionedElement, BuildingElement, GroundElement,
    MassDistributionClass, OpaqueElement, TransparentElement,
};
pub use error::{FabricError, FabricResult};
pub use ground::{EdgeInsulation, FloorData, WindShieldLocation};
pub use surface::HeatFlowDirection;
