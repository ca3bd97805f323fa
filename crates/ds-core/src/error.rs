use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error(
        "Root-find failed to converge for {what} after {iterations} iterations (residual={residual})"
    )]
    NonConvergence {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Root-find bracket invalid for {what}: f({lo}) and f({hi}) have the same sign")]
    BracketInvalid {
        what: &'static str,
        lo: f64,
        hi: f64,
    },
}
