//! Subcommand runners.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use digipulse_sweep::{
    FailureMode, ParallelConfig, PulseShape, SeriesKey, StudyConfig, SweepConfig, run_study,
    run_sweep,
};

use crate::output::{print_phase_table, print_study_tables, print_worst_case_table};

/// Load a study configuration or pick a preset.
pub fn study_config(path: Option<&Path>, rise_time_demo: bool) -> Result<StudyConfig> {
    if let Some(path) = path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read study config: {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Invalid study config: {}", path.display()));
    }
    Ok(if rise_time_demo {
        StudyConfig::rise_time_demo()
    } else {
        StudyConfig::default()
    })
}

/// Load a sweep configuration and apply command-line overrides.
pub fn sweep_config(
    path: Option<&Path>,
    rise_time: Option<f64>,
    phase_step: Option<f64>,
    record_failures: bool,
    sequential: bool,
) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => SweepConfig::from_json_file(path)
            .with_context(|| format!("Failed to load sweep config: {}", path.display()))?,
        None => SweepConfig::default(),
    };

    if let Some(rise_time) = rise_time {
        let shape = PulseShape::from_rise_time(rise_time);
        config = config.with_shape(shape).with_window(shape.default_window());
    }
    if let Some(step) = phase_step {
        config = config.with_phase_step(step);
    }
    if record_failures {
        config = config.with_failure_mode(FailureMode::Record);
    }
    if sequential {
        config = config.with_parallel(ParallelConfig::sequential());
    }
    Ok(config)
}

pub fn run_study_command(config: &StudyConfig, json: bool) -> Result<()> {
    let report = run_study(config).context("Study failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.rows)?);
    } else {
        print_study_tables(&report);
    }
    Ok(())
}

pub fn run_sweep_command(config: &SweepConfig, json: bool) -> Result<()> {
    let report = run_sweep(config).context("Sweep failed")?;
    let rows = report.worst_case_rows();
    tracing::info!(series = rows.len(), cells = report.table.len(), "sweep finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_worst_case_table(&rows);
        let failed = report.failed_cells();
        if failed > 0 {
            eprintln!("Warning: {failed} cells failed; see failed_cells per series");
        }
    }
    Ok(())
}

pub fn run_phase_scan(
    amplitude: f64,
    rise_time: Option<f64>,
    phase_step: f64,
    samples: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut config = SweepConfig::phase_scan(amplitude).with_phase_step(phase_step);
    if let Some(rise_time) = rise_time {
        let shape = PulseShape::from_rise_time(rise_time);
        config = config.with_shape(shape).with_window(shape.default_window());
    }

    let report = run_sweep(&config).context("Phase scan failed")?;
    let series: Vec<&SeriesKey> = report
        .worst_cases
        .keys()
        .filter(|key| samples.is_none_or(|n| key.sample_count == n))
        .collect();
    if series.is_empty() {
        anyhow::bail!("No series with the requested sample count");
    }

    if json {
        let dump: Vec<serde_json::Value> = series
            .iter()
            .map(|key| {
                serde_json::json!({
                    "series": key,
                    "errors": report.phase_series(key),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        print_phase_table(&report, &series);
    }
    Ok(())
}

pub fn run_waveform_dump(config: &StudyConfig, output: Option<&Path>) -> Result<()> {
    let report = run_study(config).context("Study failed")?;
    let text = serde_json::to_string_pretty(&report)?;

    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write waveforms: {}", path.display()))?;
            tracing::info!(path = %path.display(), "waveforms written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
