use thiserror::Error;

pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Control schedule is empty")]
    EmptySchedule,

    #[error("Control schedule step must be positive (got {step})")]
    InvalidStep { step: f64 },

    #[error("Advanced start must not be negative (got {hours})")]
    NegativeAdvancedStart { hours: f64 },

    #[error("Setpoint minimum {min} exceeds maximum {max}")]
    MinAboveMax { min: f64, max: f64 },
}
