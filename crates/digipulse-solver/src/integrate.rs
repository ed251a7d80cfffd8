//! Rectangle-rule integration and error metrics.

use digipulse_core::Waveform;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Left-rectangle (left Riemann sum) integral of a waveform.
///
/// Each interval contributes `y_i * (t_{i+1} - t_i)`; the last value is never
/// used as a height. A single-point waveform integrates to zero.
pub fn integrate_rectangle(waveform: &Waveform) -> f64 {
    let t = waveform.times();
    let y = waveform.values();
    t.windows(2)
        .zip(y)
        .map(|(dt, &height)| height * (dt[1] - dt[0]))
        .sum()
}

/// Absolute and relative deviation from a reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// `|approx - reference|`.
    pub absolute: f64,
    /// `absolute / |reference| * 100`.
    pub relative_percent: f64,
}

/// Compare an approximation against a reference value.
///
/// Fails with [`Error::UndefinedReference`] when the reference is zero and
/// with [`Error::InvalidParameter`] when either input is not finite, so that
/// no NaN or infinity reaches aggregated error tracking.
pub fn error_metrics(approx: f64, reference: f64) -> Result<ErrorMetrics> {
    if !approx.is_finite() || !reference.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "error metrics need finite inputs, got approx={approx}, reference={reference}"
        )));
    }
    if reference == 0.0 {
        return Err(Error::UndefinedReference);
    }

    let absolute = (approx - reference).abs();
    Ok(ErrorMetrics {
        absolute,
        relative_percent: absolute / reference.abs() * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staircase() -> Waveform {
        Waveform::new(
            vec![0.0, 1.0, 3.0, 4.0, 7.0, 8.0],
            vec![2.0, 5.0, -1.0, 4.0, 3.0, 100.0],
        )
        .unwrap()
    }

    #[test]
    fn test_left_rectangle_ignores_last_value() {
        // 2*1 + 5*2 + (-1)*1 + 4*3 + 3*1
        assert_eq!(integrate_rectangle(&staircase()), 26.0);
    }

    #[test]
    fn test_single_point_is_zero() {
        let w = Waveform::new(vec![1.0], vec![42.0]).unwrap();
        assert_eq!(integrate_rectangle(&w), 0.0);
    }

    #[test]
    fn test_additive_over_split() {
        let w = staircase();
        let whole = integrate_rectangle(&w);
        for k in 0..w.len() {
            let head = w.slice(0..k + 1).unwrap();
            let tail = w.slice(k..w.len()).unwrap();
            assert_eq!(integrate_rectangle(&head) + integrate_rectangle(&tail), whole);
        }
    }

    #[test]
    fn test_additive_over_split_real_valued() {
        let w = Waveform::from_points((0..50).map(|i| {
            let t = i as f64 * 0.37e-9;
            (t, (t * 1e9).cos())
        }))
        .unwrap();
        let whole = integrate_rectangle(&w);
        for k in [1, 7, 25, 48] {
            let split = integrate_rectangle(&w.slice(0..k + 1).unwrap())
                + integrate_rectangle(&w.slice(k..w.len()).unwrap());
            assert!((split - whole).abs() <= 1e-12 * whole.abs());
        }
    }

    #[test]
    fn test_self_comparison_is_exact() {
        for x in [1.0, -3.5, 6.7e-9, 1e300] {
            let m = error_metrics(x, x).unwrap();
            assert_eq!(m.absolute, 0.0);
            assert_eq!(m.relative_percent, 0.0);
        }
    }

    #[test]
    fn test_relative_percent() {
        let m = error_metrics(1.1, 1.0).unwrap();
        assert!((m.absolute - 0.1).abs() < 1e-15);
        assert!((m.relative_percent - 10.0).abs() < 1e-12);
        let m = error_metrics(-0.9, -1.0).unwrap();
        assert!((m.relative_percent - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_reference_is_error() {
        assert_eq!(error_metrics(1.0, 0.0), Err(Error::UndefinedReference));
        assert_eq!(error_metrics(0.0, -0.0), Err(Error::UndefinedReference));
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        assert!(matches!(
            error_metrics(f64::NAN, 1.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            error_metrics(1.0, f64::INFINITY),
            Err(Error::InvalidParameter(_))
        ));
    }
}
