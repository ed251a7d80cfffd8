//! Phase sweeps and comparison studies for digipulse.
//!
//! A sweep evaluates the digitization pipeline over a grid of amplitudes,
//! sampling phases, sample counts, ADC resolutions and reconstruction kinds,
//! and tracks the worst relative error of every series over phase.
//!
//! # Features
//!
//! - `parallel` (default) - Evaluate sweep tasks on the rayon thread pool
//!
//! # Usage
//!
//! ```ignore
//! use digipulse_sweep::{SweepConfig, run_sweep};
//!
//! let report = run_sweep(&SweepConfig::default())?;
//! for row in report.worst_case_rows() {
//!     println!("{} {} {:?}", row.sample_count, row.adc, row.max_relative_percent);
//! }
//! ```

pub mod config;
mod error;
pub mod harness;
pub mod study;
pub mod table;
pub mod worst_case;

pub use config::{
    FailureMode, ParallelConfig, PulseShape, SampleCounts, SweepConfig, TimeWindow, TrimPolicies,
};
pub use error::{Error, Result};
pub use harness::{SweepReport, WorstCaseRow, run_sweep};
pub use study::{SampleSet, StudyConfig, StudyReport, StudyRow, run_study};
pub use table::{CellOutcome, SeriesKey, SweepKey, SweepTable};
pub use worst_case::{PhaseError, WorstCase, WorstCaseTracker, worst_cases};
