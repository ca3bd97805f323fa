use ds_core::CoreError;
use thiserror::Error;

pub type AirflowResult<T> = Result<T, AirflowError>;

#[derive(Error, Debug)]
pub enum AirflowError {
    #[error("Airflow network configuration invalid: {what}")]
    InvalidConfig { what: &'static str },

    #[error("No wind pressure coefficient for {what}")]
    WindTable { what: &'static str },

    #[error("No flow factor for this combustion appliance: {what}")]
    CombustionTable { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),
}
