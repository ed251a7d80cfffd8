//! Sweep configuration.
//!
//! Configurations are plain data with `Default` presets and `with_*`
//! builders. They can also be loaded from JSON; missing fields take their
//! default values.

use std::path::Path;

use digipulse_core::{PulseParameters, TrimPolicy};
use digipulse_solver::{AdcResolution, QuadratureConfig, ReconstructionKind};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rise time used by the default presets (3 ns).
pub const DEFAULT_RISE_TIME: f64 = 3.0e-9;

/// Relative slack applied before flooring a per-sigma sample count, so a
/// product that lands a few ulps below an integer still reaches it.
const SAMPLE_COUNT_GUARD: f64 = 1e-9;

/// Largest sample count a window may resolve to.
pub const MAX_SAMPLE_COUNT: usize = 1_000_000;

/// Largest number of phases a sweep may visit (a 0.01° step).
pub const MAX_PHASES: usize = 36_000;

/// Pulse shape without amplitude: the part shared by every swept amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseShape {
    /// Rise-time constant in seconds.
    pub sigma: f64,
    /// Decay constant in seconds.
    pub tau: f64,
}

impl PulseShape {
    /// σ = rise_time / 1.69 and τ = 3σ.
    pub fn from_rise_time(rise_time: f64) -> Self {
        let sigma = rise_time / 1.69;
        Self {
            sigma,
            tau: 3.0 * sigma,
        }
    }

    /// Full pulse parameters for one amplitude.
    pub fn with_amplitude(&self, amplitude: f64) -> Result<PulseParameters> {
        Ok(PulseParameters::new(amplitude, self.sigma, self.tau)?)
    }

    /// Window from five rise constants before the peak to seven decay
    /// constants after it.
    pub fn default_window(&self) -> TimeWindow {
        TimeWindow {
            start: -5.0 * self.sigma,
            stop: 7.0 * self.tau,
        }
    }
}

impl Default for PulseShape {
    fn default() -> Self {
        Self::from_rise_time(DEFAULT_RISE_TIME)
    }
}

/// Acquisition window `[start, stop]` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub stop: f64,
}

impl TimeWindow {
    pub fn new(start: f64, stop: f64) -> Result<Self> {
        let window = Self { start, stop };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.stop.is_finite() || self.stop <= self.start {
            return Err(Error::InvalidConfig(format!(
                "time window [{}, {}] must be finite with start < stop",
                self.start, self.stop
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// The same window moved by `offset` seconds.
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            start: self.start + offset,
            stop: self.stop + offset,
        }
    }

    /// Shift for a sampling phase: one full turn moves the window by σ.
    pub fn at_phase(&self, phase_degrees: f64, sigma: f64) -> Self {
        self.shifted(sigma * phase_degrees / 360.0)
    }
}

/// How many samples to draw per window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleCounts {
    /// Fixed sample counts.
    Explicit(Vec<usize>),
    /// Samples per σ; resolved against the window duration.
    PerSigma(Vec<f64>),
}

impl SampleCounts {
    /// Resolve to concrete sample counts for a window and rise constant.
    ///
    /// Per-sigma densities become `floor(sps * duration / sigma)`. Counts
    /// must lie in `2..=MAX_SAMPLE_COUNT` and be distinct.
    pub fn resolve(&self, window: &TimeWindow, sigma: f64) -> Result<Vec<usize>> {
        let counts = match self {
            SampleCounts::Explicit(counts) => counts.clone(),
            SampleCounts::PerSigma(densities) => densities
                .iter()
                .map(|&sps| {
                    if !sps.is_finite() || sps <= 0.0 {
                        return Err(Error::InvalidConfig(format!(
                            "samples per sigma must be positive, got {sps}"
                        )));
                    }
                    let raw = (sps * window.duration() / sigma) * (1.0 + SAMPLE_COUNT_GUARD);
                    if !raw.is_finite() || raw > MAX_SAMPLE_COUNT as f64 {
                        return Err(Error::InvalidConfig(format!(
                            "{sps} samples per sigma exceeds the maximum of \
                             {MAX_SAMPLE_COUNT} samples per window"
                        )));
                    }
                    Ok(raw.floor() as usize)
                })
                .collect::<Result<Vec<_>>>()?,
        };

        if counts.is_empty() {
            return Err(Error::InvalidConfig("no sample counts given".into()));
        }
        if let Some(&n) = counts.iter().find(|&&n| n < 2) {
            return Err(Error::InvalidConfig(format!(
                "sample count {n} is below the minimum of 2"
            )));
        }
        if let Some(&n) = counts.iter().find(|&&n| n > MAX_SAMPLE_COUNT) {
            return Err(Error::InvalidConfig(format!(
                "sample count {n} exceeds the maximum of {MAX_SAMPLE_COUNT}"
            )));
        }
        let mut sorted = counts.clone();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::InvalidConfig(format!(
                "sample count {} appears more than once",
                pair[0]
            )));
        }
        Ok(counts)
    }
}

/// Trim policy for each reconstruction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimPolicies {
    pub raw: TrimPolicy,
    pub linear: TrimPolicy,
    pub cubic: TrimPolicy,
}

impl TrimPolicies {
    /// No trimming on any path.
    pub const NONE: TrimPolicies = TrimPolicies {
        raw: TrimPolicy::NONE,
        linear: TrimPolicy::NONE,
        cubic: TrimPolicy::NONE,
    };

    pub fn for_kind(&self, kind: ReconstructionKind) -> TrimPolicy {
        match kind {
            ReconstructionKind::Raw => self.raw,
            ReconstructionKind::Linear => self.linear,
            ReconstructionKind::CubicSpline => self.cubic,
        }
    }
}

impl Default for TrimPolicies {
    /// Raw and linear paths drop one sample at each end; the cubic path keeps
    /// every knot and narrows its evaluation range instead. All three then
    /// cover `[t_1, t_{N-2}]`.
    fn default() -> Self {
        Self {
            raw: TrimPolicy::EDGES,
            linear: TrimPolicy::EDGES,
            cubic: TrimPolicy::NONE,
        }
    }
}

/// What to do when a single cell of the sweep fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort the sweep with the first error.
    #[default]
    FailFast,
    /// Store the failure in the table and keep going.
    Record,
}

/// Configuration for parallel sweep execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Minimum tasks to use parallel execution (below this, sequential is faster).
    pub min_tasks_for_parallel: usize,
    /// Minimum tasks handed to one rayon job. None = rayon default.
    pub chunk_size: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_tasks_for_parallel: 4,
            chunk_size: None,
        }
    }
}

impl ParallelConfig {
    /// Never run in parallel.
    pub fn sequential() -> Self {
        Self {
            min_tasks_for_parallel: usize::MAX,
            chunk_size: None,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    pub fn with_min_parallel(mut self, min: usize) -> Self {
        self.min_tasks_for_parallel = min;
        self
    }
}

/// Full description of a phase sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub shape: PulseShape,
    pub amplitudes: Vec<f64>,
    /// Window at phase zero.
    pub window: TimeWindow,
    pub sample_counts: SampleCounts,
    pub resolutions: Vec<AdcResolution>,
    pub reconstructions: Vec<ReconstructionKind>,
    /// Phases run over `0, step, 2*step, ...` strictly below 360.
    pub phase_step_degrees: f64,
    pub trims: TrimPolicies,
    pub quadrature: QuadratureConfig,
    pub failure_mode: FailureMode,
    pub parallel: ParallelConfig,
}

impl Default for SweepConfig {
    /// Worst-case search over five amplitudes, 1 to 4 samples per σ, ideal,
    /// 8-bit and 12-bit sampling, in 5° phase steps.
    fn default() -> Self {
        let shape = PulseShape::default();
        Self {
            shape,
            amplitudes: vec![0.05, 0.1, 0.2, 0.5, 1.0],
            window: shape.default_window(),
            sample_counts: SampleCounts::PerSigma(vec![1.0, 2.0, 3.0, 4.0]),
            resolutions: vec![
                AdcResolution::Ideal,
                AdcResolution::Bits(8),
                AdcResolution::Bits(12),
            ],
            reconstructions: ReconstructionKind::ALL.to_vec(),
            phase_step_degrees: 5.0,
            trims: TrimPolicies::default(),
            quadrature: QuadratureConfig::default(),
            failure_mode: FailureMode::FailFast,
            parallel: ParallelConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Phase scan of a single amplitude in 3° steps.
    pub fn phase_scan(amplitude: f64) -> Self {
        Self::default()
            .with_amplitudes(vec![amplitude])
            .with_phase_step(3.0)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_shape(mut self, shape: PulseShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_amplitudes(mut self, amplitudes: Vec<f64>) -> Self {
        self.amplitudes = amplitudes;
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

    pub fn with_phase_step(mut self, degrees: f64) -> Self {
        self.phase_step_degrees = degrees;
        self
    }

    pub fn with_trims(mut self, trims: TrimPolicies) -> Self {
        self.trims = trims;
        self
    }

    pub fn with_quadrature(mut self, quadrature: QuadratureConfig) -> Self {
        self.quadrature = quadrature;
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Swept phases in degrees.
    pub fn phases(&self) -> Vec<f64> {
        let step = self.phase_step_degrees;
        (0..)
            .map(|i| i as f64 * step)
            .take_while(|&phase| phase < 360.0)
            .collect()
    }

    /// Check the configuration before any computation.
    pub fn validate(&self) -> Result<()> {
        self.shape.with_amplitude(1.0)?;
        self.window.validate()?;

        if self.amplitudes.is_empty() {
            return Err(Error::InvalidConfig("no amplitudes given".into()));
        }
        if let Some(a) = self.amplitudes.iter().find(|a| !a.is_finite()) {
            return Err(Error::InvalidConfig(format!("amplitude {a} is not finite")));
        }
        let mut amplitudes = self.amplitudes.clone();
        amplitudes.sort_by(f64::total_cmp);
        if let Some(pair) = amplitudes.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::InvalidConfig(format!(
                "amplitude {} appears more than once",
                pair[0]
            )));
        }
        if self.resolutions.is_empty() {
            return Err(Error::InvalidConfig("no ADC resolutions given".into()));
        }
        if self.reconstructions.is_empty() {
            return Err(Error::InvalidConfig("no reconstruction kinds given".into()));
        }
        if !self.phase_step_degrees.is_finite()
            || self.phase_step_degrees <= 0.0
            || self.phase_step_degrees >= 360.0
        {
            return Err(Error::InvalidConfig(format!(
                "phase step must lie in (0, 360) degrees, got {}",
                self.phase_step_degrees
            )));
        }
        if (360.0 / self.phase_step_degrees).ceil() > MAX_PHASES as f64 {
            return Err(Error::InvalidConfig(format!(
                "phase step {} visits more than {MAX_PHASES} phases",
                self.phase_step_degrees
            )));
        }
        self.sample_counts.resolve(&self.window, self.shape.sigma)?;
        Ok(())
    }
}
