use ds_climate::ClimateError;
use thiserror::Error;

pub type FabricResult<T> = Result<T, FabricError>;

#[derive(Error, Debug)]
pub enum FabricError {
    #[error("{what} must be positive (got {value})")]
    NonPositive { what: &'static str, value: f64 },

    #[error("{what} out of range (got {value})")]
    OutOfRange { what: &'static str, value: f64 },

    #[error(
        "virtual-layer resistance of ground floor must be positive (got {r_vi}); \
         check the floor u-value against its construction resistance"
    )]
    GroundVirtualResistance { r_vi: f64 },

    #[error("an edge-insulated slab floor needs at least one edge insulation entry")]
    MissingEdgeInsulation,

    #[error("a full year of weather data is needed to construct a ground floor element")]
    AnnualWeatherUnavailable,

    #[error(transparent)]
    Climate(#[from] ClimateError),
}
