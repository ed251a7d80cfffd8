//! Error types for digipulse-solver.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] digipulse_core::Error),

    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("relative error is undefined for a zero reference value")]
    UndefinedReference,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("singular matrix")]
    SingularSystem,

    #[error(
        "quadrature did not converge after {subdivisions} subdivisions (estimated error {estimated_error:e})"
    )]
    QuadratureNotConverged {
        subdivisions: usize,
        estimated_error: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
