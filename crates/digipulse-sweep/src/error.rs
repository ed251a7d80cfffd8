//! Error types for sweeps and studies.

use thiserror::Error;

/// Errors that can occur while configuring or running a sweep.
#[derive(Debug, Error)]
pub enum Error {
    /// A pipeline stage failed.
    #[error(transparent)]
    Solver(#[from] digipulse_solver::Error),

    /// Invalid pulse parameters or waveform.
    #[error(transparent)]
    Core(#[from] digipulse_core::Error),

    /// The configuration is unusable.
    #[error("invalid sweep configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for the expected type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sweep operations.
pub type Result<T> = std::result::Result<T, Error>;
