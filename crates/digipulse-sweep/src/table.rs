//! Typed keys and the result table of a sweep.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use digipulse_solver::{AdcResolution, ErrorMetrics, ReconstructionKind, ReferenceIntegral};
use serde::{Deserialize, Serialize};

/// Identifies one error series: everything except the phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesKey {
    pub amplitude: f64,
    pub sample_count: usize,
    pub adc: AdcResolution,
    pub reconstruction: ReconstructionKind,
}

impl SeriesKey {
    /// The cell of this series at `phase_degrees`.
    pub fn at_phase(self, phase_degrees: f64) -> SweepKey {
        SweepKey {
            series: self,
            phase_degrees,
        }
    }
}

impl PartialEq for SeriesKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SeriesKey {}

impl PartialOrd for SeriesKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeriesKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.amplitude
            .total_cmp(&other.amplitude)
            .then(self.sample_count.cmp(&other.sample_count))
            .then(self.adc.cmp(&other.adc))
            .then(self.reconstruction.cmp(&other.reconstruction))
    }
}

/// Identifies one cell of a sweep.
///
/// Ordering is by series first, then by phase, so iterating a
/// [`SweepTable`] visits each series in ascending phase order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepKey {
    #[serde(flatten)]
    pub series: SeriesKey,
    pub phase_degrees: f64,
}

impl PartialEq for SweepKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SweepKey {}

impl PartialOrd for SweepKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.series
            .cmp(&other.series)
            .then(self.phase_degrees.total_cmp(&other.phase_degrees))
    }
}

/// Result of one sweep cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CellOutcome {
    Measured {
        integral: f64,
        reference: ReferenceIntegral,
        metrics: ErrorMetrics,
    },
    /// Only produced when failures are recorded instead of aborting.
    Failed { reason: String },
}

impl CellOutcome {
    pub fn relative_percent(&self) -> Option<f64> {
        match self {
            CellOutcome::Measured { metrics, .. } => Some(metrics.relative_percent),
            CellOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CellOutcome::Failed { .. })
    }
}

/// All cells of a sweep, ordered by key.
pub type SweepTable = BTreeMap<SweepKey, CellOutcome>;
