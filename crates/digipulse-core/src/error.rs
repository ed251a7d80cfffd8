//! Error types for digipulse-core.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("waveform has no points")]
    EmptyWaveform,

    #[error("waveform length mismatch: {times} times, {values} values")]
    LengthMismatch { times: usize, values: usize },

    #[error("waveform time is not strictly increasing at index {index}")]
    NonMonotonicTime { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
