//! Adaptive Gauss-Kronrod quadrature and the reference pulse integral.
//!
//! The integrator is globally adaptive: the interval with the largest error
//! estimate is bisected until the summed estimate meets the tolerance. Each
//! interval is evaluated with the 15-point Kronrod rule and its embedded
//! 7-point Gauss rule, using the QUADPACK error scaling.

use digipulse_core::PulseParameters;
use digipulse_core::pulse::pulse;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kronrod abscissae on [-1, 1]; odd indices are the Gauss nodes.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Kronrod weights.
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for XGK[1], XGK[3], XGK[5] and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Tolerances for adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureConfig {
    /// Absolute error tolerance.
    pub epsabs: f64,
    /// Relative error tolerance.
    pub epsrel: f64,
    /// Maximum number of subintervals.
    pub max_subdivisions: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            epsabs: 0.0,
            epsrel: 1e-10,
            max_subdivisions: 200,
        }
    }
}

impl QuadratureConfig {
    pub fn with_epsabs(mut self, epsabs: f64) -> Self {
        self.epsabs = epsabs;
        self
    }

    pub fn with_epsrel(mut self, epsrel: f64) -> Self {
        self.epsrel = epsrel;
        self
    }

    pub fn with_max_subdivisions(mut self, limit: usize) -> Self {
        self.max_subdivisions = limit;
        self
    }
}

/// An integral value with its estimated absolute error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceIntegral {
    pub value: f64,
    pub estimated_error: f64,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// One 15-point Kronrod evaluation over `[a, b]`, returning (value, error).
fn kronrod15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64) {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(center);

    let mut res_k = WGK[7] * fc;
    let mut res_g = WG[3] * fc;
    let mut res_abs = res_k.abs();
    let mut fv1 = [0.0; 7];
    let mut fv2 = [0.0; 7];

    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = f(center - dx);
        let f2 = f(center + dx);
        fv1[j] = f1;
        fv2[j] = f2;
        res_k += WGK[j] * (f1 + f2);
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_g += WG[j / 2] * (f1 + f2);
        }
    }

    let mean = 0.5 * res_k;
    let mut res_asc = WGK[7] * (fc - mean).abs();
    for j in 0..7 {
        res_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    let value = res_k * half;
    let res_abs = res_abs * half.abs();
    let res_asc = res_asc * half.abs();
    let mut error = ((res_k - res_g) * half).abs();

    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    (value, error)
}

/// Integrate `f` over `[a, b]` with globally adaptive Gauss-Kronrod quadrature.
pub fn integrate_adaptive<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    config: &QuadratureConfig,
) -> Result<ReferenceIntegral> {
    if !(a.is_finite() && b.is_finite()) || b <= a {
        return Err(Error::InvalidParameter(format!(
            "integration bounds must satisfy a < b, got [{a}, {b}]"
        )));
    }
    if config.max_subdivisions == 0 {
        return Err(Error::InvalidParameter(
            "max_subdivisions must be positive".to_string(),
        ));
    }

    let (value, error) = kronrod15(&f, a, b);
    let mut segments = vec![Segment { a, b, value, error }];

    loop {
        let total: f64 = segments.iter().map(|s| s.value).sum();
        let total_error: f64 = segments.iter().map(|s| s.error).sum();
        let tolerance = config.epsabs.max(config.epsrel * total.abs());

        if !total.is_finite() {
            return Err(Error::InvalidParameter(
                "integrand produced a non-finite value".to_string(),
            ));
        }
        if total_error <= tolerance {
            return Ok(ReferenceIntegral {
                value: total,
                estimated_error: total_error,
            });
        }
        if segments.len() >= config.max_subdivisions {
            return Err(Error::QuadratureNotConverged {
                subdivisions: segments.len(),
                estimated_error: total_error,
            });
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        if mid <= seg.a || mid >= seg.b {
            // Interval can no longer be bisected in floating point.
            return Err(Error::QuadratureNotConverged {
                subdivisions: segments.len() + 1,
                estimated_error: total_error,
            });
        }

        let (left_value, left_error) = kronrod15(&f, seg.a, mid);
        let (right_value, right_error) = kronrod15(&f, mid, seg.b);
        segments.push(Segment {
            a: seg.a,
            b: mid,
            value: left_value,
            error: left_error,
        });
        segments.push(Segment {
            a: mid,
            b: seg.b,
            value: right_value,
            error: right_error,
        });
    }
}

/// High-accuracy integral of the pulse over `[t0, t1]`.
///
/// The domain is split at the branch threshold so that each piece is smooth.
pub fn reference_integral(params: &PulseParameters, t0: f64, t1: f64) -> Result<ReferenceIntegral> {
    reference_integral_with(params, t0, t1, &QuadratureConfig::default())
}

/// [`reference_integral`] with explicit tolerances.
pub fn reference_integral_with(
    params: &PulseParameters,
    t0: f64,
    t1: f64,
    config: &QuadratureConfig,
) -> Result<ReferenceIntegral> {
    params.validate()?;
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 {
        return Err(Error::InvalidParameter(format!(
            "reference window must satisfy t0 < t1, got [{t0}, {t1}]"
        )));
    }

    let f = |t: f64| pulse(t, params);
    let th = params.threshold_time();

    if th > t0 && th < t1 {
        let left = integrate_adaptive(f, t0, th, config)?;
        let right = integrate_adaptive(f, th, t1, config)?;
        Ok(ReferenceIntegral {
            value: left.value + right.value,
            estimated_error: left.estimated_error + right.estimated_error,
        })
    } else {
        integrate_adaptive(f, t0, t1, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_polynomial_is_exact() {
        let r = integrate_adaptive(|x| 3.0 * x * x + 2.0 * x, 0.0, 2.0, &QuadratureConfig::default())
            .unwrap();
        assert!((r.value - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_sine() {
        let r = integrate_adaptive(f64::sin, 0.0, PI, &QuadratureConfig::default()).unwrap();
        assert!((r.value - 2.0).abs() < 1e-12, "got {}", r.value);
        assert!(r.estimated_error < 1e-9);
    }

    #[test]
    fn test_kink_needs_subdivision() {
        let r = integrate_adaptive(|x: f64| x.abs(), -1.0, 3.0, &QuadratureConfig::default())
            .unwrap();
        assert!((r.value - 5.0).abs() < 1e-9, "got {}", r.value);
    }

    #[test]
    fn test_rejects_reversed_bounds() {
        let cfg = QuadratureConfig::default();
        assert!(matches!(
            integrate_adaptive(f64::sin, 1.0, 0.0, &cfg),
            Err(Error::InvalidParameter(_))
        ));
        assert!(integrate_adaptive(f64::sin, 0.0, f64::INFINITY, &cfg).is_err());
    }

    #[test]
    fn test_subdivision_limit() {
        let cfg = QuadratureConfig::default()
            .with_epsrel(1e-15)
            .with_max_subdivisions(2);
        let r = integrate_adaptive(|x: f64| (1.0 / x).sin(), 1e-3, 1.0, &cfg);
        assert!(matches!(r, Err(Error::QuadratureNotConverged { .. })));
    }

    #[test]
    fn test_exponential_tail_closed_form() {
        let p = PulseParameters::new(0.6, 3e-9, 9e-9).unwrap();
        let (a, b) = (4e-9, 30e-9);
        let exact = p.amplitude / p.normalization() * p.tau * ((-a / p.tau).exp() - (-b / p.tau).exp());
        let r = reference_integral(&p, a, b).unwrap();
        assert!(((r.value - exact) / exact).abs() < 1e-10);
    }

    #[test]
    fn test_gaussian_half_closed_form() {
        let p = PulseParameters::new(0.6, 3e-9, 9e-9).unwrap();
        // The Gaussian tail below -15σ is far beneath double precision.
        let exact = p.amplitude * p.sigma * (PI / 2.0).sqrt();
        let r = reference_integral(&p, -15.0 * p.sigma, 0.0).unwrap();
        assert!(((r.value - exact) / exact).abs() < 1e-10, "got {} vs {}", r.value, exact);
    }

    #[test]
    fn test_split_matches_piecewise_sum() {
        let p = PulseParameters::new(1.0, 1.775e-9, 5.325e-9).unwrap();
        let th = p.threshold_time();
        let whole = reference_integral(&p, -8e-9, 30e-9).unwrap();
        let left = reference_integral(&p, -8e-9, th).unwrap();
        let right = reference_integral(&p, th, 30e-9).unwrap();
        assert!(((whole.value - (left.value + right.value)) / whole.value).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_in_domain() {
        let p = PulseParameters::new(0.6, 3e-9, 9e-9).unwrap();
        let outer = reference_integral(&p, -10e-9, 15e-9).unwrap();
        let inner = reference_integral(&p, -5e-9, 10e-9).unwrap();
        let tiny = reference_integral(&p, 1e-9, 1.5e-9).unwrap();
        assert!(outer.value >= inner.value);
        assert!(inner.value >= tiny.value);
        assert!(tiny.value > 0.0);
    }

    #[test]
    fn test_zero_amplitude() {
        let p = PulseParameters::new(0.0, 3e-9, 9e-9).unwrap();
        let r = reference_integral(&p, -10e-9, 15e-9).unwrap();
        assert_eq!(r.value, 0.0);
    }
}
