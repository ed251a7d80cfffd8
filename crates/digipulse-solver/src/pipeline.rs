//! One sampling path: trim, reconstruct, integrate, compare.

use digipulse_core::{PulseParameters, TrimPolicy, Waveform};

use crate::error::{Error, Result};
use crate::integrate::{ErrorMetrics, error_metrics, integrate_rectangle};
use crate::quadrature::{QuadratureConfig, ReferenceIntegral, reference_integral_with};
use crate::reconstruct::ReconstructionKind;

/// Outcome of evaluating one path over a sample set.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// The waveform that was integrated.
    pub waveform: Waveform,
    /// Rectangle-rule integral of `waveform`.
    pub integral: f64,
    /// Reference integral over the span of `waveform`.
    pub reference: ReferenceIntegral,
    pub metrics: ErrorMetrics,
}

/// Number of samples a path needs before trimming.
pub fn required_samples(kind: ReconstructionKind, trim: TrimPolicy) -> usize {
    // The integrated waveform needs a non-empty span for the reference.
    trim.removed() + kind.min_points().max(2)
}

/// Evaluate a path over `samples`.
///
/// The reference integral always covers exactly the span of the waveform
/// being integrated, so trimmed and narrowed paths are compared against the
/// matching part of the pulse.
pub fn evaluate_path(
    samples: &Waveform,
    kind: ReconstructionKind,
    trim: TrimPolicy,
    params: &PulseParameters,
    quadrature: &QuadratureConfig,
) -> Result<PathResult> {
    let required = required_samples(kind, trim);
    if samples.len() < required {
        return Err(Error::InsufficientSamples {
            required,
            actual: samples.len(),
        });
    }

    let trimmed = samples.trim(trim)?;
    let waveform = kind.reconstruct(&trimmed)?;
    let integral = integrate_rectangle(&waveform);
    let (t0, t1) = waveform.span();
    let reference = reference_integral_with(params, t0, t1, quadrature)?;
    let metrics = error_metrics(integral, reference.value)?;

    log::trace!(
        "{kind} path over [{t0:e}, {t1:e}]: integral {integral:e}, reference {:e}, {:.4}%",
        reference.value,
        metrics.relative_percent
    );

    Ok(PathResult {
        waveform,
        integral,
        reference,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::sample;

    fn params() -> PulseParameters {
        PulseParameters::new(0.6, 3e-9, 9e-9).unwrap()
    }

    #[test]
    fn test_trimmed_paths_share_domain() {
        let p = params();
        let samples = sample(-10e-9, 15e-9, 32, &p).unwrap();
        let cfg = QuadratureConfig::default();
        let t = samples.times();

        let path = |kind, trim| evaluate_path(&samples, kind, trim, &p, &cfg).unwrap();
        let raw = path(ReconstructionKind::Raw, TrimPolicy::EDGES);
        let linear = path(ReconstructionKind::Linear, TrimPolicy::EDGES);
        let cubic = path(ReconstructionKind::CubicSpline, TrimPolicy::NONE);

        for r in [&raw, &linear, &cubic] {
            assert_eq!(r.waveform.first_time(), t[1]);
            assert_eq!(r.waveform.last_time(), t[30]);
        }
        assert_eq!(raw.reference, linear.reference);
        assert_eq!(raw.reference, cubic.reference);
    }

    #[test]
    fn test_too_few_samples_for_trim() {
        let p = params();
        let samples = sample(-10e-9, 15e-9, 4, &p).unwrap();
        let cfg = QuadratureConfig::default();
        let err = evaluate_path(
            &samples,
            ReconstructionKind::CubicSpline,
            TrimPolicy::EDGES,
            &p,
            &cfg,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientSamples {
                required: 6,
                actual: 4
            }
        );
    }

    #[test]
    fn test_zero_amplitude_reports_undefined_reference() {
        let p = params().with_amplitude(0.0);
        let samples = sample(-10e-9, 15e-9, 16, &p).unwrap();
        let err = evaluate_path(
            &samples,
            ReconstructionKind::Raw,
            TrimPolicy::NONE,
            &p,
            &QuadratureConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, Error::UndefinedReference);
    }
}
