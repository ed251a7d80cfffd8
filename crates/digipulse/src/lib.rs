//! # digipulse
//!
//! Digitization and reconstruction error analysis for photomultiplier pulses.
//!
//! digipulse models an analog detector pulse in closed form, samples it with
//! an ideal or n-bit ADC, reconstructs a denser waveform by linear or cubic
//! spline interpolation, integrates with the rectangle rule and compares the
//! result with an adaptive-quadrature reference integral:
//! - Analytic pulse model and validated waveforms
//! - Sampling with optional quantization
//! - Linear and not-a-knot cubic spline reconstruction
//! - Rectangle integration and error metrics
//! - Parallel phase sweeps with worst-case tracking
//!
//! ## Quick Start
//!
//! ```rust
//! use digipulse::prelude::*;
//!
//! let pulse = PulseParameters::new(0.6, 3e-9, 9e-9).unwrap();
//! let samples = sample(-10e-9, 15e-9, 32, &pulse).unwrap();
//! let reference = reference_integral(&pulse, -10e-9, 15e-9).unwrap();
//!
//! let metrics = error_metrics(integrate_rectangle(&samples), reference.value).unwrap();
//! assert!(metrics.relative_percent < 2.0);
//! ```
//!
//! ## Sweeps
//!
//! ```rust,ignore
//! use digipulse::prelude::*;
//!
//! let report = run_sweep(&SweepConfig::phase_scan(0.6))?;
//! for row in report.worst_case_rows() {
//!     println!("{} {} {} {:?}", row.sample_count, row.adc, row.reconstruction, row.max_relative_percent);
//! }
//! ```
//!
//! ## Features
//!
//! - `parallel` (default) - Run sweep tasks on the rayon thread pool

// Re-export member crates
pub use digipulse_core as core;
pub use digipulse_solver as solver;
pub use digipulse_sweep as sweep;

// ============================================================================
// Convenient re-exports from digipulse_core
// ============================================================================

pub use digipulse_core::{PulseParameters, TrimPolicy, Waveform, linspace, pulse, pulse_values};

// ============================================================================
// Convenient re-exports from digipulse_solver
// ============================================================================

pub use digipulse_solver::{
    // Sampling
    AdcResolution,
    // Reconstruction
    CubicSpline,
    CubicSplineReconstructor,
    // Integration
    ErrorMetrics,
    LinearReconstructor,
    PathResult,
    // Quadrature
    QuadratureConfig,
    Quantizer,
    ReconstructionKind,
    Reconstructor,
    ReferenceIntegral,
    error_metrics,
    evaluate_path,
    integrate_rectangle,
    reference_integral,
    sample,
    sample_quantized,
    sample_with,
};

// ============================================================================
// Convenient re-exports from digipulse_sweep
// ============================================================================

pub use digipulse_sweep::{
    CellOutcome, FailureMode, ParallelConfig, PhaseError, PulseShape, SampleCounts, SeriesKey,
    StudyConfig, StudyReport, StudyRow, SweepConfig, SweepKey, SweepReport, SweepTable,
    TimeWindow, TrimPolicies, WorstCase, WorstCaseRow, WorstCaseTracker, run_study, run_sweep,
};

// ============================================================================
// Prelude
// ============================================================================

/// Common imports.
///
/// ```rust
/// use digipulse::prelude::*;
/// ```
pub mod prelude {
    // Pulse and waveforms
    pub use crate::{PulseParameters, TrimPolicy, Waveform, pulse};

    // Pipeline stages
    pub use crate::{
        AdcResolution, ReconstructionKind, error_metrics, evaluate_path, integrate_rectangle,
        reference_integral, sample, sample_with,
    };

    // Sweeps and studies
    pub use crate::{
        FailureMode, SampleCounts, StudyConfig, SweepConfig, TimeWindow, run_study, run_sweep,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_through_facade() {
        let p = PulseParameters::from_rise_time(0.5, 3e-9).unwrap();
        let samples = sample_with(-5.0 * p.sigma, 7.0 * p.tau, 52, &p, AdcResolution::Bits(12))
            .unwrap();
        let path = evaluate_path(
            &samples,
            ReconstructionKind::CubicSpline,
            TrimPolicy::NONE,
            &p,
            &QuadratureConfig::default(),
        )
        .unwrap();
        assert!(path.metrics.relative_percent < 1.0);
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let config = SweepConfig::default().with_sample_counts(SampleCounts::Explicit(vec![16]));
        assert!(config.validate().is_ok());
        assert_eq!(ReconstructionKind::Linear.label(), "linear");
    }
}
