//! Error types for full-run simulation.

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] ds_core::CoreError),

    #[error(transparent)]
    Climate(#[from] ds_climate::ClimateError),

    #[error(transparent)]
    Airflow(#[from] ds_airflow::AirflowError),

    #[error(transparent)]
    Zone(#[from] ds_zone::ZoneError),
}
