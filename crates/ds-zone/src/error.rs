use ds_climate::ClimateError;
use ds_fabric::FabricError;
use thiserror::Error;

pub type ZoneResult<T> = Result<T, ZoneError>;

#[derive(Error, Debug)]
pub enum ZoneError {
    #[error("Zone configuration invalid: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Cooling setpoint {cool} is below heating setpoint {heat}")]
    SetpointOrdering { heat: f64, cool: f64 },

    #[error("Zone heat balance produced a non-finite temperature")]
    SolverDegenerate,

    #[error(
        "Demand interpolation degenerate: probe load did not change the zone \
         temperature (check element heat capacities)"
    )]
    DegenerateInterpolation,

    #[error("Initial node temperatures did not settle within {iterations} iterations")]
    InitNotSettled { iterations: usize },

    #[error(transparent)]
    Fabric(#[from] FabricError),

    #[error(transparent)]
    Climate(#[from] ClimateError),
}
