//! Not-a-knot cubic spline interpolation.
//!
//! The spline is built in the second-derivative ("moment") form. Not-a-knot
//! end conditions require the third derivative to be continuous across the
//! second and the second-to-last knot, which lets `M₀` and `Mₙ₋₁` be expressed
//! through their neighbours. The remaining square system for the interior
//! moments is solved with a dense LU factorization.

use digipulse_core::Waveform;
use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Minimum number of knots for a not-a-knot spline.
pub const MIN_KNOTS: usize = 4;

/// A fitted cubic spline.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    moments: Vec<f64>,
}

impl CubicSpline {
    /// Fit a not-a-knot cubic spline through every point of `data`.
    pub fn fit(data: &Waveform) -> Result<Self> {
        let n = data.len();
        if n < MIN_KNOTS {
            return Err(Error::InsufficientSamples {
                required: MIN_KNOTS,
                actual: n,
            });
        }

        let x = data.times();
        let y = data.values();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let slopes: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        // Unknowns are M_1 ..= M_{n-2}; column j of the matrix holds M_{j+1}.
        let size = n - 2;
        let mut a = DMatrix::<f64>::zeros(size, size);
        let mut rhs = DVector::<f64>::zeros(size);

        let (h0, h1) = (h[0], h[1]);
        let (ha, hb) = (h[n - 3], h[n - 2]);

        for i in 1..n - 1 {
            let row = i - 1;
            rhs[row] = 6.0 * (slopes[i] - slopes[i - 1]);

            let mut add = |j: usize, coeff: f64| {
                if j == 0 {
                    // M_0 = (1 + h0/h1) M_1 - (h0/h1) M_2
                    a[(row, 0)] += coeff * (1.0 + h0 / h1);
                    a[(row, 1)] -= coeff * h0 / h1;
                } else if j == n - 1 {
                    // M_{n-1} = (1 + hb/ha) M_{n-2} - (hb/ha) M_{n-3}
                    a[(row, size - 1)] += coeff * (1.0 + hb / ha);
                    a[(row, size - 2)] -= coeff * hb / ha;
                } else {
                    a[(row, j - 1)] += coeff;
                }
            };

            add(i - 1, h[i - 1]);
            add(i, 2.0 * (h[i - 1] + h[i]));
            add(i + 1, h[i]);
        }

        let interior = a.lu().solve(&rhs).ok_or(Error::SingularSystem)?;

        let mut moments = Vec::with_capacity(n);
        moments.push((1.0 + h0 / h1) * interior[0] - h0 / h1 * interior[1]);
        moments.extend(interior.iter().copied());
        moments.push((1.0 + hb / ha) * interior[size - 1] - hb / ha * interior[size - 2]);

        Ok(Self {
            knots: x.to_vec(),
            values: y.to_vec(),
            moments,
        })
    }

    /// Knot times.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Second derivative at each knot.
    pub fn moments(&self) -> &[f64] {
        &self.moments
    }

    /// Evaluate the spline at `t`.
    ///
    /// Outside the knot range the first or last cubic piece is extended.
    pub fn evaluate(&self, t: f64) -> f64 {
        let last = self.knots.len() - 2;
        let i = self.knots.partition_point(|&k| k <= t).saturating_sub(1).min(last);

        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.moments[i], self.moments[i + 1]);
        let h = x1 - x0;
        let left = x1 - t;
        let right = t - x0;

        m0 * left.powi(3) / (6.0 * h)
            + m1 * right.powi(3) / (6.0 * h)
            + (y0 - m0 * h * h / 6.0) * left / h
            + (y1 - m1 * h * h / 6.0) * right / h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(x: f64) -> f64 {
        x * x * x - 2.0 * x + 1.0
    }

    #[test]
    fn test_reproduces_cubic_on_irregular_grid() {
        let xs = [0.0, 0.5, 1.5, 2.0, 3.0, 4.2];
        let data = Waveform::from_points(xs.iter().map(|&x| (x, cubic(x)))).unwrap();
        let spline = CubicSpline::fit(&data).unwrap();

        for k in 0..=84 {
            let t = k as f64 * 0.05;
            let expected = cubic(t);
            let got = spline.evaluate(t);
            assert!((got - expected).abs() < 1e-9, "t={t}: {got} vs {expected}");
        }
    }

    #[test]
    fn test_four_knots_reproduce_cubic() {
        let data = Waveform::from_points([-1.0, 0.0, 2.0, 3.0].map(|x| (x, cubic(x)))).unwrap();
        let spline = CubicSpline::fit(&data).unwrap();
        assert!((spline.evaluate(1.0) - cubic(1.0)).abs() < 1e-10);
        assert!((spline.evaluate(2.5) - cubic(2.5)).abs() < 1e-10);
    }

    #[test]
    fn test_passes_through_knots() {
        let data = Waveform::from_points((0..10).map(|i| {
            let x = i as f64 * 1e-9;
            (x, (x * 1e9).sin())
        }))
        .unwrap();
        let spline = CubicSpline::fit(&data).unwrap();
        for (t, v) in data.iter() {
            assert!((spline.evaluate(t) - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_data_has_zero_moments() {
        let data = Waveform::from_points((0..6).map(|i| (i as f64, 3.0 * i as f64 - 1.0))).unwrap();
        let spline = CubicSpline::fit(&data).unwrap();
        assert!(spline.moments().iter().all(|m| m.abs() < 1e-12));
        assert!((spline.evaluate(2.25) - 5.75).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_knots() {
        let data = Waveform::from_points([(0.0, 1.0), (1.0, 2.0), (2.0, 0.0)]).unwrap();
        assert!(matches!(
            CubicSpline::fit(&data),
            Err(Error::InsufficientSamples {
                required: 4,
                actual: 3
            })
        ));
    }
}
