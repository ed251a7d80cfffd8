//! Core pulse model and waveform types for digipulse.
//!
//! This crate provides the analytic photomultiplier pulse, the validated
//! [`Waveform`] sequence shared by every pipeline stage, and SI unit helpers.

pub mod error;
pub mod pulse;
pub mod units;
pub mod waveform;

pub use error::{Error, Result};
pub use pulse::{PulseParameters, pulse, pulse_values};
pub use waveform::{TrimPolicy, Waveform, linspace};
