//! Numerical pipeline for digipulse.
//!
//! This crate provides:
//! - Adaptive Gauss-Kronrod quadrature for the reference pulse integral
//! - Uniform sampling with optional ADC quantization
//! - Linear and not-a-knot cubic spline reconstruction
//! - Left-rectangle integration and error metrics
//! - Single-path evaluation combining the stages above

pub mod error;
pub mod integrate;
pub mod pipeline;
pub mod quadrature;
pub mod reconstruct;
pub mod sampler;
pub mod spline;

pub use error::{Error, Result};
pub use integrate::{ErrorMetrics, error_metrics, integrate_rectangle};
pub use pipeline::{PathResult, evaluate_path, required_samples};
pub use quadrature::{
    QuadratureConfig, ReferenceIntegral, integrate_adaptive, reference_integral,
    reference_integral_with,
};
pub use reconstruct::{
    CubicSplineReconstructor, LinearReconstructor, ReconstructionKind, Reconstructor,
    interpolate_linear,
};
pub use sampler::{AdcResolution, Quantizer, sample, sample_quantized, sample_with};
pub use spline::CubicSpline;
