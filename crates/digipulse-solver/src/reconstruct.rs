//! Reconstruction of dense waveforms from sparse samples.

use std::fmt;

use digipulse_core::{Waveform, linspace};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spline::{CubicSpline, MIN_KNOTS};

/// Output points per input point produced by the default reconstructors.
pub const DEFAULT_UPSAMPLE: usize = 10;

/// A strategy that turns a sample set into a denser waveform.
pub trait Reconstructor: Send + Sync {
    /// Minimum number of input samples accepted.
    fn min_points(&self) -> usize;

    /// Build the dense waveform.
    fn reconstruct(&self, samples: &Waveform) -> Result<Waveform>;
}

fn check_len(samples: &Waveform, required: usize) -> Result<()> {
    if samples.len() < required {
        return Err(Error::InsufficientSamples {
            required,
            actual: samples.len(),
        });
    }
    Ok(())
}

/// Piecewise-linear interpolation over the full input span.
#[derive(Debug, Clone, Copy)]
pub struct LinearReconstructor {
    pub upsample: usize,
}

impl Default for LinearReconstructor {
    fn default() -> Self {
        Self {
            upsample: DEFAULT_UPSAMPLE,
        }
    }
}

impl Reconstructor for LinearReconstructor {
    fn min_points(&self) -> usize {
        2
    }

    fn reconstruct(&self, samples: &Waveform) -> Result<Waveform> {
        check_len(samples, self.min_points())?;

        let (start, stop) = samples.span();
        let times = linspace(start, stop, samples.len() * self.upsample.max(1));
        let values = interpolate_linear(samples, &times);
        Ok(Waveform::new(times, values)?)
    }
}

/// Linear interpolation of `samples` at ascending `times`.
///
/// Times outside the sample span take the nearest end value.
pub fn interpolate_linear(samples: &Waveform, times: &[f64]) -> Vec<f64> {
    let xs = samples.times();
    let ys = samples.values();
    let last = xs.len() - 1;
    let mut seg = 0;

    times
        .iter()
        .map(|&t| {
            if t <= xs[0] {
                return ys[0];
            }
            if t >= xs[last] {
                return ys[last];
            }
            while seg + 1 < last && xs[seg + 1] <= t {
                seg += 1;
            }
            let (x0, x1) = (xs[seg], xs[seg + 1]);
            let (y0, y1) = (ys[seg], ys[seg + 1]);
            y0 + (y1 - y0) * (t - x0) / (x1 - x0)
        })
        .collect()
}

/// Not-a-knot cubic spline through every sample, evaluated over
/// `[t_second, t_second_to_last]` to stay clear of the boundary pieces.
#[derive(Debug, Clone, Copy)]
pub struct CubicSplineReconstructor {
    pub upsample: usize,
}

impl Default for CubicSplineReconstructor {
    fn default() -> Self {
        Self {
            upsample: DEFAULT_UPSAMPLE,
        }
    }
}

impl Reconstructor for CubicSplineReconstructor {
    fn min_points(&self) -> usize {
        MIN_KNOTS
    }

    fn reconstruct(&self, samples: &Waveform) -> Result<Waveform> {
        check_len(samples, self.min_points())?;

        let spline = CubicSpline::fit(samples)?;
        let xs = samples.times();
        let times = linspace(xs[1], xs[xs.len() - 2], samples.len() * self.upsample.max(1));
        let values = times.iter().map(|&t| spline.evaluate(t)).collect();
        Ok(Waveform::new(times, values)?)
    }
}

/// Which reconstruction a pipeline path applies before integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionKind {
    /// Integrate the samples directly.
    Raw,
    /// Piecewise-linear reconstruction.
    Linear,
    /// Not-a-knot cubic spline reconstruction.
    CubicSpline,
}

impl ReconstructionKind {
    pub const ALL: [ReconstructionKind; 3] = [
        ReconstructionKind::Raw,
        ReconstructionKind::Linear,
        ReconstructionKind::CubicSpline,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReconstructionKind::Raw => "raw",
            ReconstructionKind::Linear => "linear",
            ReconstructionKind::CubicSpline => "cubic",
        }
    }

    /// Minimum number of samples this path needs.
    pub fn min_points(&self) -> usize {
        match self {
            ReconstructionKind::Raw => 1,
            ReconstructionKind::Linear => LinearReconstructor::default().min_points(),
            ReconstructionKind::CubicSpline => CubicSplineReconstructor::default().min_points(),
        }
    }

    /// Apply the default reconstructor of this kind. `Raw` returns a copy.
    pub fn reconstruct(&self, samples: &Waveform) -> Result<Waveform> {
        match self {
            ReconstructionKind::Raw => Ok(samples.clone()),
            ReconstructionKind::Linear => LinearReconstructor::default().reconstruct(samples),
            ReconstructionKind::CubicSpline => {
                CubicSplineReconstructor::default().reconstruct(samples)
            }
        }
    }
}

impl fmt::Display for ReconstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent(t: f64) -> f64 {
        if t < 2.0 { 1.0 + 0.5 * t } else { 4.0 - t }
    }

    #[test]
    fn test_linear_is_exact_for_piecewise_linear_signal() {
        // Kink at a sample time, so the signal is linear between samples.
        let samples = Waveform::from_points((0..7).map(|i| {
            let t = i as f64 * 0.5;
            (t, tent(t))
        }))
        .unwrap();
        let dense = LinearReconstructor::default().reconstruct(&samples).unwrap();

        assert_eq!(dense.len(), 70);
        assert_eq!(dense.span(), samples.span());
        for (t, v) in dense.iter() {
            assert!((v - tent(t)).abs() < 1e-12, "t={t}: {v} vs {}", tent(t));
        }
    }

    #[test]
    fn test_linear_irregular_grid() {
        let samples = Waveform::new(vec![0.0, 1.0, 4.0], vec![0.0, 2.0, -4.0]).unwrap();
        let v = interpolate_linear(&samples, &[0.5, 1.0, 2.5, 4.0]);
        assert_eq!(v, vec![1.0, 2.0, -1.0, -4.0]);
    }

    #[test]
    fn test_linear_needs_two_points() {
        let one = Waveform::new(vec![0.0], vec![1.0]).unwrap();
        assert!(matches!(
            LinearReconstructor::default().reconstruct(&one),
            Err(Error::InsufficientSamples {
                required: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_cubic_domain_excludes_boundary_samples() {
        let samples = Waveform::from_points((0..8).map(|i| {
            let t = i as f64;
            (t, (0.3 * t).sin())
        }))
        .unwrap();
        let dense = CubicSplineReconstructor::default().reconstruct(&samples).unwrap();
        assert_eq!(dense.len(), 80);
        assert_eq!(dense.first_time(), 1.0);
        assert_eq!(dense.last_time(), 6.0);
        for (t, v) in dense.iter() {
            assert!((v - (0.3 * t).sin()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_cubic_needs_four_points() {
        let three = Waveform::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap();
        assert!(matches!(
            ReconstructionKind::CubicSpline.reconstruct(&three),
            Err(Error::InsufficientSamples {
                required: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_kind_dispatch() {
        let samples = Waveform::from_points((0..5).map(|i| (i as f64, i as f64))).unwrap();
        assert_eq!(ReconstructionKind::Raw.reconstruct(&samples).unwrap(), samples);
        assert_eq!(ReconstructionKind::Linear.reconstruct(&samples).unwrap().len(), 50);
        assert_eq!(ReconstructionKind::CubicSpline.min_points(), 4);
        assert_eq!(ReconstructionKind::CubicSpline.to_string(), "cubic");
    }
}
