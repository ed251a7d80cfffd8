//! Analytic photomultiplier pulse model.
//!
//! The pulse is a two-branch closed form: a Gaussian rising edge centred at
//! `t = 0` followed by an exponential falling edge. The branches meet at the
//! threshold time `th = 2σ²/τ`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::waveform::Waveform;

/// Shape and scale of a photomultiplier pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseParameters {
    /// Peak amplitude (V).
    pub amplitude: f64,
    /// Gaussian rise-time constant σ (s).
    pub sigma: f64,
    /// Exponential decay constant τ (s).
    pub tau: f64,
}

impl PulseParameters {
    /// Create validated pulse parameters.
    ///
    /// `sigma` and `tau` must be positive and finite; `amplitude` must be finite.
    pub fn new(amplitude: f64, sigma: f64, tau: f64) -> Result<Self> {
        let params = Self {
            amplitude,
            sigma,
            tau,
        };
        params.validate()?;
        Ok(params)
    }

    /// Derive σ and τ from a 10-90 rise time, using σ = tr / 1.69 and τ = 3σ.
    pub fn from_rise_time(amplitude: f64, rise_time: f64) -> Result<Self> {
        let sigma = rise_time / 1.69;
        Self::new(amplitude, sigma, 3.0 * sigma)
    }

    /// Check that the parameters describe a finite, well-formed pulse.
    pub fn validate(&self) -> Result<()> {
        if !self.amplitude.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "amplitude must be finite, got {}",
                self.amplitude
            )));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "sigma must be positive, got {}",
                self.sigma
            )));
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "tau must be positive, got {}",
                self.tau
            )));
        }
        Ok(())
    }

    /// Same shape with a different amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Time at which the Gaussian edge hands over to the exponential tail.
    pub fn threshold_time(&self) -> f64 {
        2.0 * self.sigma * self.sigma / self.tau
    }

    /// Normalization constant of the exponential branch.
    pub fn normalization(&self) -> f64 {
        let st = self.sigma * self.tau;
        (-0.5 * st * st).exp()
    }

    /// Evaluate the pulse at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        pulse(t, self)
    }
}

/// Evaluate the pulse model at time `t`.
pub fn pulse(t: f64, params: &PulseParameters) -> f64 {
    if t <= params.threshold_time() {
        gaussian_edge(t, params)
    } else {
        exponential_tail(t, params)
    }
}

pub(crate) fn gaussian_edge(t: f64, params: &PulseParameters) -> f64 {
    let x = t / params.sigma;
    params.amplitude * (-0.5 * x * x).exp()
}

pub(crate) fn exponential_tail(t: f64, params: &PulseParameters) -> f64 {
    params.amplitude / params.normalization() * (-t / params.tau).exp()
}

/// Evaluate the pulse on `start, start + step, ...` strictly below `stop`.
///
/// This is the dense "ideal" curve used as a visual reference next to samples
/// and reconstructions.
pub fn pulse_values(params: &PulseParameters, start: f64, stop: f64, step: f64) -> Result<Waveform> {
    if !(start.is_finite() && stop.is_finite()) || stop <= start {
        return Err(Error::InvalidParameter(format!(
            "time span must be positive, got [{start}, {stop}]"
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "time step must be positive, got {step}"
        )));
    }

    let count = ((stop - start) / step).ceil() as usize;
    let times: Vec<f64> = (0..count)
        .map(|i| start + i as f64 * step)
        .filter(|&t| t < stop)
        .collect();
    let values = times.iter().map(|&t| pulse(t, params)).collect();

    Waveform::new(times, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_pulse() -> PulseParameters {
        PulseParameters::new(0.6, 3e-9, 9e-9).unwrap()
    }

    #[test]
    fn test_peak_at_zero() {
        let p = reference_pulse();
        assert_eq!(pulse(0.0, &p), 0.6);
    }

    #[test]
    fn test_branches_agree_at_threshold() {
        for (a, sigma, tau) in [(0.6, 3e-9, 9e-9), (1.0, 1.775e-9, 5.325e-9), (0.05, 1e-9, 2e-9)] {
            let p = PulseParameters::new(a, sigma, tau).unwrap();
            let th = p.threshold_time();
            let left = gaussian_edge(th, &p);
            let right = exponential_tail(th, &p);
            assert!(
                (left - right).abs() <= 1e-12 * a,
                "discontinuity at th: {left} vs {right}"
            );
            // Just past the threshold the tail branch is active and still close.
            let after = pulse(th * (1.0 + 1e-12), &p);
            assert!((after - left).abs() < 1e-9 * a);
        }
    }

    #[test]
    fn test_threshold_time() {
        let p = reference_pulse();
        assert!((p.threshold_time() - 2e-9).abs() < 1e-21);
    }

    #[test]
    fn test_decays_on_both_sides() {
        let p = reference_pulse();
        assert!(pulse(-10e-9, &p) < 0.01);
        assert!(pulse(50e-9, &p) < 0.01);
        assert!(pulse(-1e-9, &p) > pulse(-2e-9, &p));
        assert!(pulse(5e-9, &p) > pulse(6e-9, &p));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(PulseParameters::new(1.0, 0.0, 1e-9).is_err());
        assert!(PulseParameters::new(1.0, 1e-9, -1e-9).is_err());
        assert!(PulseParameters::new(f64::NAN, 1e-9, 1e-9).is_err());
        assert!(PulseParameters::new(0.0, 1e-9, 1e-9).is_ok());
    }

    #[test]
    fn test_from_rise_time() {
        let p = PulseParameters::from_rise_time(0.6, 3e-9).unwrap();
        assert!((p.sigma - 3e-9 / 1.69).abs() < 1e-24);
        assert!((p.tau - 3.0 * p.sigma).abs() < 1e-24);
    }

    #[test]
    fn test_pulse_values_excludes_stop() {
        let p = reference_pulse();
        let w = pulse_values(&p, 0.0, 1e-9, 0.25e-9).unwrap();
        assert_eq!(w.len(), 4);
        assert!(w.last_time() < 1e-9);
        assert_eq!(w.values()[0], 0.6);
    }

    #[test]
    fn test_pulse_values_rejects_bad_step() {
        let p = reference_pulse();
        assert!(pulse_values(&p, 0.0, 1e-9, 0.0).is_err());
        assert!(pulse_values(&p, 1e-9, 0.0, 1e-12).is_err());
    }
}
