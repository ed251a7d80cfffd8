//! Sweep execution.
//!
//! A sweep is a flat list of independent tasks, one per
//! (amplitude, phase, sample count). Each task samples the pulse once per
//! ADC resolution and runs every reconstruction path on those samples.
//! Task results are merged into a [`SweepTable`] keyed by parameters, so the
//! report does not depend on the order in which tasks finish.

use std::collections::BTreeMap;

use digipulse_core::PulseParameters;
use digipulse_solver::{evaluate_path, sample_with};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{FailureMode, SweepConfig};
use crate::error::Result;
use crate::table::{CellOutcome, SeriesKey, SweepKey, SweepTable};
use crate::worst_case::{PhaseError, WorstCase, worst_cases};

/// One unit of parallel work.
#[derive(Debug, Clone, Copy)]
struct SweepTask {
    params: PulseParameters,
    phase_degrees: f64,
    sample_count: usize,
}

type TaskResult = Result<Vec<(SweepKey, CellOutcome)>>;

/// Reporting row for one series' worst case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstCaseRow {
    pub amplitude: f64,
    pub sample_count: usize,
    pub adc: String,
    pub reconstruction: String,
    /// `None` when every cell of the series failed.
    pub max_relative_percent: Option<f64>,
    pub phase_degrees: Option<f64>,
    pub failed_cells: usize,
}

/// Everything a sweep produced.
///
/// The table is keyed by structs and has no JSON form; export
/// [`SweepReport::worst_case_rows`] or [`SweepReport::phase_series`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    pub table: SweepTable,
    pub worst_cases: BTreeMap<SeriesKey, WorstCase>,
}

impl SweepReport {
    fn from_table(table: SweepTable) -> Self {
        let worst_cases = worst_cases(&table);
        Self { table, worst_cases }
    }

    /// Relative error per phase for one series, ascending in phase.
    ///
    /// Failed cells are left out.
    pub fn phase_series(&self, series: &SeriesKey) -> Vec<PhaseError> {
        let lo = series.at_phase(f64::NEG_INFINITY);
        let hi = series.at_phase(f64::INFINITY);
        self.table
            .range(lo..=hi)
            .filter_map(|(key, outcome)| {
                outcome.relative_percent().map(|relative_percent| PhaseError {
                    phase_degrees: key.phase_degrees,
                    relative_percent,
                })
            })
            .collect()
    }

    /// One row per series, in key order.
    pub fn worst_case_rows(&self) -> Vec<WorstCaseRow> {
        self.worst_cases
            .iter()
            .map(|(series, case)| WorstCaseRow {
                amplitude: series.amplitude,
                sample_count: series.sample_count,
                adc: series.adc.label(),
                reconstruction: series.reconstruction.label().to_string(),
                max_relative_percent: case.worst.map(|w| w.relative_percent),
                phase_degrees: case.worst.map(|w| w.phase_degrees),
                failed_cells: case.failed_cells,
            })
            .collect()
    }

    pub fn failed_cells(&self) -> usize {
        self.table.values().filter(|cell| cell.is_failed()).count()
    }
}

/// Run a sweep.
///
/// With [`FailureMode::FailFast`] the first failing cell, in key order of the
/// tasks, aborts the sweep. With [`FailureMode::Record`] failures end up in
/// the table as [`CellOutcome::Failed`].
pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport> {
    config.validate()?;

    let counts = config
        .sample_counts
        .resolve(&config.window, config.shape.sigma)?;
    let phases = config.phases();

    let mut tasks = Vec::with_capacity(config.amplitudes.len() * phases.len() * counts.len());
    for &amplitude in &config.amplitudes {
        let params = config.shape.with_amplitude(amplitude)?;
        for &phase_degrees in &phases {
            for &sample_count in &counts {
                tasks.push(SweepTask {
                    params,
                    phase_degrees,
                    sample_count,
                });
            }
        }
    }

    log::info!(
        "Sweeping {} amplitudes x {} phases x {} sample counts ({} cells)",
        config.amplitudes.len(),
        phases.len(),
        counts.len(),
        tasks.len() * config.resolutions.len() * config.reconstructions.len()
    );

    let results = run_tasks(config, &tasks);

    let mut table = SweepTable::new();
    for result in results {
        table.extend(result?);
    }

    let report = SweepReport::from_table(table);
    let failed = report.failed_cells();
    if failed > 0 {
        log::warn!("{failed} sweep cells failed and were recorded");
    }
    Ok(report)
}

#[cfg(feature = "parallel")]
fn run_tasks(config: &SweepConfig, tasks: &[SweepTask]) -> Vec<TaskResult> {
    let parallel = &config.parallel;
    let use_parallel =
        tasks.len() >= parallel.min_tasks_for_parallel && rayon::current_num_threads() > 1;

    if !use_parallel {
        return run_tasks_sequential(config, tasks);
    }

    log::debug!(
        "Using parallel sweep ({} tasks, {} threads)",
        tasks.len(),
        rayon::current_num_threads()
    );

    let min_len = parallel.chunk_size.unwrap_or(1).max(1);
    tasks
        .par_iter()
        .with_min_len(min_len)
        .map(|task| evaluate_task(config, task))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_tasks(config: &SweepConfig, tasks: &[SweepTask]) -> Vec<TaskResult> {
    run_tasks_sequential(config, tasks)
}

fn run_tasks_sequential(config: &SweepConfig, tasks: &[SweepTask]) -> Vec<TaskResult> {
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result = evaluate_task(config, task);
        let failed = result.is_err();
        results.push(result);
        if failed {
            break;
        }
    }
    results
}

/// Evaluate every (resolution, reconstruction) cell of one task.
fn evaluate_task(config: &SweepConfig, task: &SweepTask) -> TaskResult {
    let window = config.window.at_phase(task.phase_degrees, config.shape.sigma);
    let mut cells = Vec::with_capacity(config.resolutions.len() * config.reconstructions.len());

    for &adc in &config.resolutions {
        let samples = sample_with(
            window.start,
            window.stop,
            task.sample_count,
            &task.params,
            adc,
        );

        for &reconstruction in &config.reconstructions {
            let key = SeriesKey {
                amplitude: task.params.amplitude,
                sample_count: task.sample_count,
                adc,
                reconstruction,
            }
            .at_phase(task.phase_degrees);

            let result = samples.as_ref().map_err(Clone::clone).and_then(|samples| {
                evaluate_path(
                    samples,
                    reconstruction,
                    config.trims.for_kind(reconstruction),
                    &task.params,
                    &config.quadrature,
                )
            });

            let outcome = match result {
                Ok(path) => CellOutcome::Measured {
                    integral: path.integral,
                    reference: path.reference,
                    metrics: path.metrics,
                },
                Err(err) => match config.failure_mode {
                    FailureMode::FailFast => return Err(err.into()),
                    FailureMode::Record => {
                        log::debug!(
                            "Cell A={} N={} {adc} {reconstruction} at {}° failed: {err}",
                            task.params.amplitude,
                            task.sample_count,
                            task.phase_degrees
                        );
                        CellOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                },
            };
            cells.push((key, outcome));
        }
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParallelConfig, SampleCounts};
    use digipulse_solver::{AdcResolution, ReconstructionKind};

    fn small_config() -> SweepConfig {
        SweepConfig::default()
            .with_amplitudes(vec![0.5])
            .with_sample_counts(SampleCounts::Explicit(vec![26]))
            .with_phase_step(45.0)
    }

    #[test]
    fn test_table_has_every_cell() {
        let report = run_sweep(&small_config()).unwrap();
        // 8 phases x 3 resolutions x 3 reconstructions
        assert_eq!(report.table.len(), 72);
        assert_eq!(report.worst_cases.len(), 9);
        assert_eq!(report.failed_cells(), 0);

        for case in report.worst_cases.values() {
            assert_eq!(case.measured_cells, 8);
            assert!(case.worst.is_some());
        }
    }

    #[test]
    fn test_phase_series_is_ordered_and_complete() {
        let report = run_sweep(&small_config()).unwrap();
        let series = SeriesKey {
            amplitude: 0.5,
            sample_count: 26,
            adc: AdcResolution::Bits(12),
            reconstruction: ReconstructionKind::Linear,
        };
        let errors = report.phase_series(&series);
        let phases: Vec<f64> = errors.iter().map(|e| e.phase_degrees).collect();
        assert_eq!(phases, vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]);

        let worst = report.worst_cases[&series].worst.unwrap();
        let max = errors
            .iter()
            .map(|e| e.relative_percent)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(worst.relative_percent, max);
    }

    #[test]
    fn test_fail_fast_aborts() {
        // Cubic needs four samples; three is too few.
        let config = small_config()
            .with_sample_counts(SampleCounts::Explicit(vec![3]))
            .with_parallel(ParallelConfig::sequential());
        assert!(run_sweep(&config).is_err());
    }

    #[test]
    fn test_record_mode_keeps_going() {
        let config = small_config()
            .with_sample_counts(SampleCounts::Explicit(vec![3]))
            .with_failure_mode(FailureMode::Record);
        let report = run_sweep(&config).unwrap();

        assert_eq!(report.table.len(), 72);
        // Raw needs 2 + 2 trimmed, linear the same, cubic 4.
        assert_eq!(report.failed_cells(), 72);
        let rows = report.worst_case_rows();
        assert!(rows.iter().all(|r| r.max_relative_percent.is_none() && r.failed_cells == 8));
    }

    #[test]
    fn test_zero_amplitude_recorded_as_failures() {
        let config = small_config()
            .with_amplitudes(vec![0.0, 0.5])
            .with_failure_mode(FailureMode::Record);
        let report = run_sweep(&config).unwrap();
        for (key, cell) in &report.table {
            assert_eq!(cell.is_failed(), key.series.amplitude == 0.0);
        }
    }
}
