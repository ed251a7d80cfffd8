//! Worst-case search over sampling phase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{SeriesKey, SweepTable};

/// Relative error observed at one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseError {
    pub phase_degrees: f64,
    pub relative_percent: f64,
}

/// Running maximum of the relative error over phases.
///
/// A new observation replaces the current worst only if it is strictly
/// greater, so among equal errors the first phase observed is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstCaseTracker {
    worst: Option<PhaseError>,
}

impl WorstCaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, phase_degrees: f64, relative_percent: f64) {
        let replace = match self.worst {
            None => true,
            Some(current) => relative_percent > current.relative_percent,
        };
        if replace {
            self.worst = Some(PhaseError {
                phase_degrees,
                relative_percent,
            });
        }
    }

    pub fn worst(&self) -> Option<PhaseError> {
        self.worst
    }
}

/// Worst case of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorstCase {
    /// `None` when every cell of the series failed.
    pub worst: Option<PhaseError>,
    pub measured_cells: usize,
    pub failed_cells: usize,
}

/// Scan a table in key order and track the worst phase of every series.
///
/// Failed cells are skipped and counted.
pub fn worst_cases(table: &SweepTable) -> BTreeMap<SeriesKey, WorstCase> {
    let mut trackers: BTreeMap<SeriesKey, (WorstCaseTracker, usize, usize)> = BTreeMap::new();

    for (key, outcome) in table {
        let (tracker, measured, failed) = trackers.entry(key.series).or_default();
        match outcome.relative_percent() {
            Some(err) => {
                tracker.observe(key.phase_degrees, err);
                *measured += 1;
            }
            None => *failed += 1,
        }
    }

    trackers
        .into_iter()
        .map(|(series, (tracker, measured_cells, failed_cells))| {
            (
                series,
                WorstCase {
                    worst: tracker.worst(),
                    measured_cells,
                    failed_cells,
                },
            )
        })
        .collect()
}
