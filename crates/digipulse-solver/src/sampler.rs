//! Uniform sampling of the pulse, with optional ADC quantization.

use std::fmt;

use digipulse_core::pulse::pulse;
use digipulse_core::{PulseParameters, Waveform, linspace};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest supported ADC bit depth.
pub const MAX_BITS: u32 = 64;

/// Resolution of the simulated ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdcResolution {
    /// No quantization.
    Ideal,
    /// Quantization to `2^n` steps of the pulse amplitude.
    Bits(u32),
}

impl AdcResolution {
    /// Short label used in reports (`ideal`, `8-bit`, ...).
    pub fn label(&self) -> String {
        match self {
            AdcResolution::Ideal => "ideal".to_string(),
            AdcResolution::Bits(n) => format!("{n}-bit"),
        }
    }
}

impl fmt::Display for AdcResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Round-to-nearest-step quantizer with step `amplitude / 2^bits`.
///
/// Ties round away from zero (`f64::round`). Division is correctly rounded, so
/// a value that is exactly an odd multiple of half a step produces an exact
/// `.5` quotient and is always treated as a tie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    bits: u32,
    step: f64,
}

impl Quantizer {
    pub fn new(amplitude: f64, bits: u32) -> Result<Self> {
        if bits == 0 || bits > MAX_BITS {
            return Err(Error::InvalidParameter(format!(
                "bit depth must be in 1..={MAX_BITS}, got {bits}"
            )));
        }
        let step = amplitude / 2f64.powi(bits as i32);
        if !(step.is_finite() && step != 0.0) {
            return Err(Error::InvalidParameter(format!(
                "quantizer step is degenerate for amplitude {amplitude}"
            )));
        }
        Ok(Self { bits, step })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Snap `value` to the nearest multiple of the step.
    pub fn quantize(&self, value: f64) -> f64 {
        (value / self.step).round() * self.step
    }
}

fn validate_grid(t0: f64, t1: f64, n: usize) -> Result<()> {
    if n < 2 {
        return Err(Error::InvalidParameter(format!(
            "sample count must be at least 2, got {n}"
        )));
    }
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        return Err(Error::InvalidParameter(format!(
            "sampling window must satisfy t0 < t1, got [{t0}, {t1}]"
        )));
    }
    Ok(())
}

/// Sample the pulse at `n` evenly spaced times over `[t0, t1]`, endpoints included.
pub fn sample(t0: f64, t1: f64, n: usize, params: &PulseParameters) -> Result<Waveform> {
    validate_grid(t0, t1, n)?;
    params.validate()?;

    let times = linspace(t0, t1, n);
    let values = times.iter().map(|&t| pulse(t, params)).collect();
    Ok(Waveform::new(times, values)?)
}

/// Sample the pulse and quantize each value to `n_bits` of the amplitude.
pub fn sample_quantized(
    t0: f64,
    t1: f64,
    n: usize,
    params: &PulseParameters,
    n_bits: u32,
) -> Result<Waveform> {
    validate_grid(t0, t1, n)?;
    params.validate()?;
    let quantizer = Quantizer::new(params.amplitude, n_bits)?;

    let times = linspace(t0, t1, n);
    let values = times
        .iter()
        .map(|&t| quantizer.quantize(pulse(t, params)))
        .collect();
    Ok(Waveform::new(times, values)?)
}

/// Sample with the given ADC resolution.
pub fn sample_with(
    t0: f64,
    t1: f64,
    n: usize,
    params: &PulseParameters,
    resolution: AdcResolution,
) -> Result<Waveform> {
    match resolution {
        AdcResolution::Ideal => sample(t0, t1, n, params),
        AdcResolution::Bits(bits) => sample_quantized(t0, t1, n, params, bits),
    }
}
