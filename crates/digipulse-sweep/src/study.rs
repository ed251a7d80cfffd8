//! Single-window comparison study.
//!
//! One pulse, one window, no phase sweep. Every combination of sample count,
//! ADC resolution and reconstruction is evaluated, and the sample sets and
//! reconstructions are kept so they can be plotted next to the ideal curve.

use digipulse_core::{PulseParameters, Waveform, pulse_values};
use digipulse_solver::{
    AdcResolution, ErrorMetrics, QuadratureConfig, ReconstructionKind, ReferenceIntegral,
    evaluate_path, reference_integral_with, sample_with,
};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_RISE_TIME, PulseShape, SampleCounts, TimeWindow, TrimPolicies};
use crate::error::{Error, Result};

/// Configuration of a comparison study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub pulse: PulseParameters,
    pub window: TimeWindow,
    pub sample_counts: SampleCounts,
    pub resolutions: Vec<AdcResolution>,
    pub reconstructions: Vec<ReconstructionKind>,
    pub trims: TrimPolicies,
    pub quadrature: QuadratureConfig,
    /// Spacing of the dense ideal curve in seconds.
    pub curve_step: f64,
}

impl Default for StudyConfig {
    /// A=0.6, σ=3 ns, τ=9 ns over [-10 ns, 15 ns] with 8, 16 and 32 samples.
    fn default() -> Self {
        Self {
            pulse: PulseParameters {
                amplitude: 0.6,
                sigma: 3.0e-9,
                tau: 9.0e-9,
            },
            window: TimeWindow {
                start: -10.0e-9,
                stop: 15.0e-9,
            },
            sample_counts: SampleCounts::Explicit(vec![8, 16, 32]),
            resolutions: vec![
                AdcResolution::Ideal,
                AdcResolution::Bits(8),
                AdcResolution::Bits(12),
            ],
            reconstructions: ReconstructionKind::ALL.to_vec(),
            trims: TrimPolicies::NONE,
            quadrature: QuadratureConfig::default(),
            curve_step: 0.001e-9,
        }
    }
}

impl StudyConfig {
    /// Pulse derived from a 3 ns rise time, sampled at 1 to 4 samples per σ
    /// over the default sweep window shifted to a 325° phase.
    pub fn rise_time_demo() -> Self {
        let shape = PulseShape::from_rise_time(DEFAULT_RISE_TIME);
        Self {
            pulse: PulseParameters {
                amplitude: 0.6,
                sigma: shape.sigma,
                tau: shape.tau,
            },
            window: shape.default_window().at_phase(325.0, shape.sigma),
            sample_counts: SampleCounts::PerSigma(vec![1.0, 2.0, 3.0, 4.0]),
            curve_step: 0.01e-9,
            ..Self::default()
        }
    }

    pub fn with_pulse(mut self, pulse: PulseParameters) -> Self {
        self.pulse = pulse;
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_sample_counts(mut self, counts: SampleCounts) -> Self {
        self.sample_counts = counts;
        self
    }

    pub fn with_resolutions(mut self, resolutions: Vec<AdcResolution>) -> Self {
        self.resolutions = resolutions;
        self
    }

    pub fn with_reconstructions(mut self, kinds: Vec<ReconstructionKind>) -> Self {
        self.reconstructions = kinds;
        self
    }

    pub fn with_trims(mut self, trims: TrimPolicies) -> Self {
        self.trims = trims;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.pulse.validate()?;
        self.window.validate()?;
        if self.resolutions.is_empty() || self.reconstructions.is_empty() {
            return Err(Error::InvalidConfig(
                "study needs at least one resolution and one reconstruction".into(),
            ));
        }
        if !self.curve_step.is_finite() || self.curve_step <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "curve step must be positive, got {}",
                self.curve_step
            )));
        }
        self.sample_counts.resolve(&self.window, self.pulse.sigma)?;
        Ok(())
    }
}

/// One line of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRow {
    pub sample_count: usize,
    pub adc: AdcResolution,
    pub reconstruction: ReconstructionKind,
    pub integral: f64,
    /// Reference over the span of the integrated waveform.
    pub reference: ReferenceIntegral,
    pub metrics: ErrorMetrics,
}

/// A reconstructed waveform kept for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconstruction {
    pub kind: ReconstructionKind,
    pub waveform: Waveform,
}

/// Samples drawn at one count and resolution, with their reconstructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub sample_count: usize,
    pub adc: AdcResolution,
    pub samples: Waveform,
    /// Non-raw paths only; the raw path integrates `samples` directly.
    pub reconstructions: Vec<Reconstruction>,
}

/// Output of [`run_study`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub pulse: PulseParameters,
    pub window: TimeWindow,
    /// Reference integral over the whole window.
    pub reference: ReferenceIntegral,
    /// Dense ideal curve.
    pub curve: Waveform,
    pub sample_sets: Vec<SampleSet>,
    pub rows: Vec<StudyRow>,
}

impl StudyReport {
    /// Rows of one reconstruction kind, in run order.
    pub fn rows_for(&self, kind: ReconstructionKind) -> impl Iterator<Item = &StudyRow> {
        self.rows.iter().filter(move |row| row.reconstruction == kind)
    }

    pub fn row(
        &self,
        sample_count: usize,
        adc: AdcResolution,
        kind: ReconstructionKind,
    ) -> Option<&StudyRow> {
        self.rows.iter().find(|row| {
            row.sample_count == sample_count && row.adc == adc && row.reconstruction == kind
        })
    }
}

/// Run a comparison study.
pub fn run_study(config: &StudyConfig) -> Result<StudyReport> {
    config.validate()?;

    let pulse = config.pulse;
    let window = config.window;
    let counts = config.sample_counts.resolve(&window, pulse.sigma)?;

    let reference = reference_integral_with(&pulse, window.start, window.stop, &config.quadrature)?;
    let curve = pulse_values(&pulse, window.start, window.stop, config.curve_step)?;
    log::info!(
        "Study over [{:e}, {:e}] s: reference {:e} (±{:e}), {} curve points",
        window.start,
        window.stop,
        reference.value,
        reference.estimated_error,
        curve.len()
    );

    let mut sample_sets = Vec::new();
    let mut rows = Vec::new();

    for &sample_count in &counts {
        for &adc in &config.resolutions {
            let samples = sample_with(window.start, window.stop, sample_count, &pulse, adc)?;
            let mut reconstructions = Vec::new();

            for &kind in &config.reconstructions {
                let path = evaluate_path(
                    &samples,
                    kind,
                    config.trims.for_kind(kind),
                    &pulse,
                    &config.quadrature,
                )?;
                log::debug!(
                    "N={sample_count} {adc} {kind}: {:.4}%",
                    path.metrics.relative_percent
                );

                rows.push(StudyRow {
                    sample_count,
                    adc,
                    reconstruction: kind,
                    integral: path.integral,
                    reference: path.reference,
                    metrics: path.metrics,
                });
                if kind != ReconstructionKind::Raw {
                    reconstructions.push(Reconstruction {
                        kind,
                        waveform: path.waveform,
                    });
                }
            }

            sample_sets.push(SampleSet {
                sample_count,
                adc,
                samples,
                reconstructions,
            });
        }
    }

    Ok(StudyReport {
        pulse,
        window,
        reference,
        curve,
        sample_sets,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_study_shape() {
        let report = run_study(&StudyConfig::default()).unwrap();
        assert_eq!(report.rows.len(), 27);
        assert_eq!(report.sample_sets.len(), 9);
        assert!(report.sample_sets.iter().all(|set| set.reconstructions.len() == 2));
        assert_eq!(report.curve.first_time(), -10.0e-9);
        assert!(report.curve.last_time() < 15.0e-9);
    }

    #[test]
    fn test_raw_rows_use_full_window_reference() {
        let report = run_study(&StudyConfig::default()).unwrap();
        for row in report.rows_for(ReconstructionKind::Raw) {
            assert_eq!(row.reference, report.reference);
        }
        // The cubic path is evaluated between the second and second-to-last
        // sample, so its reference covers less of the pulse.
        let cubic = report
            .row(8, AdcResolution::Ideal, ReconstructionKind::CubicSpline)
            .unwrap();
        assert!(cubic.reference.value < report.reference.value);
    }

    #[test]
    fn test_rise_time_demo_counts() {
        let config = StudyConfig::rise_time_demo();
        let counts = config
            .sample_counts
            .resolve(&config.window, config.pulse.sigma)
            .unwrap();
        assert_eq!(counts, vec![26, 52, 78, 104]);

        let shift = config.window.start - (-5.0 * config.pulse.sigma);
        assert!((shift - config.pulse.sigma * 325.0 / 360.0).abs() < 1e-20);
    }

    #[test]
    fn test_rejects_bad_curve_step() {
        let config = StudyConfig {
            curve_step: 0.0,
            ..StudyConfig::default()
        };
        assert!(matches!(run_study(&config), Err(Error::InvalidConfig(_))));
    }
}
