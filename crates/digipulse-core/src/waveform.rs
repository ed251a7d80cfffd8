//! Sampled time/value sequences.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of samples dropped from each end of a waveform before it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrimPolicy {
    /// Samples dropped from the start.
    pub leading: usize,
    /// Samples dropped from the end.
    pub trailing: usize,
}

impl TrimPolicy {
    /// Keep every sample.
    pub const NONE: TrimPolicy = TrimPolicy {
        leading: 0,
        trailing: 0,
    };

    /// Drop the first and the last sample.
    pub const EDGES: TrimPolicy = TrimPolicy {
        leading: 1,
        trailing: 1,
    };

    pub fn new(leading: usize, trailing: usize) -> Self {
        Self { leading, trailing }
    }

    /// Total number of samples removed.
    pub fn removed(&self) -> usize {
        self.leading + self.trailing
    }
}

/// An ordered sequence of (time, value) pairs with strictly increasing time.
///
/// Spacing may be irregular. A waveform always holds at least one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWaveform")]
pub struct Waveform {
    times: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawWaveform {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<RawWaveform> for Waveform {
    type Error = Error;

    fn try_from(raw: RawWaveform) -> Result<Self> {
        Waveform::new(raw.times, raw.values)
    }
}

impl Waveform {
    /// Create a waveform, checking lengths and time ordering.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(Error::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(Error::EmptyWaveform);
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "non-finite time at index {index}"
            )));
        }
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::NonMonotonicTime { index: index + 1 });
        }
        Ok(Self { times, values })
    }

    /// Create a waveform from (time, value) pairs.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        let (times, values) = points.into_iter().unzip();
        Self::new(times, values)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over (time, value) pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Time of the first point.
    pub fn first_time(&self) -> f64 {
        self.times[0]
    }

    /// Time of the last point.
    pub fn last_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Covered time span `(first, last)`.
    pub fn span(&self) -> (f64, f64) {
        (self.first_time(), self.last_time())
    }

    /// Copy out a sub-range of points.
    pub fn slice(&self, range: Range<usize>) -> Result<Waveform> {
        if range.start >= range.end || range.end > self.len() {
            return Err(Error::InvalidParameter(format!(
                "slice {}..{} out of bounds for waveform of {} points",
                range.start,
                range.end,
                self.len()
            )));
        }
        Ok(Self {
            times: self.times[range.clone()].to_vec(),
            values: self.values[range].to_vec(),
        })
    }

    /// Drop samples from both ends according to `policy`.
    pub fn trim(&self, policy: TrimPolicy) -> Result<Waveform> {
        if policy.removed() >= self.len() {
            return Err(Error::InvalidParameter(format!(
                "trim of {} samples leaves nothing of {}",
                policy.removed(),
                self.len()
            )));
        }
        self.slice(policy.leading..self.len() - policy.trailing)
    }

    /// Consume the waveform, returning the underlying vectors.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.times, self.values)
    }
}

/// `n` evenly spaced points over `[start, stop]`, both ends included.
///
/// The last point is exactly `stop`. `n = 1` yields `[start]`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }
    let step = (stop - start) / (n - 1) as f64;
    let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
    if let Some(last) = out.last_mut() {
        *last = stop;
    }
    out
}
