//! Table output for study and sweep results.

use digipulse_core::units::format_quantity;
use digipulse_solver::ReconstructionKind;
use digipulse_sweep::{PhaseError, SeriesKey, StudyReport, SweepReport, WorstCaseRow};

pub fn print_study_tables(report: &StudyReport) {
    let pulse = &report.pulse;
    println!("Comparison Study");
    println!("================");
    println!();
    println!(
        "Pulse: A = {}, sigma = {}, tau = {}",
        format_quantity(pulse.amplitude, "V"),
        format_quantity(pulse.sigma, "s"),
        format_quantity(pulse.tau, "s"),
    );
    println!(
        "Window: [{}, {}]",
        format_quantity(report.window.start, "s"),
        format_quantity(report.window.stop, "s"),
    );
    println!(
        "Reference integral: {:.6e} (estimated error {:.6e})",
        report.reference.value, report.reference.estimated_error
    );

    for kind in ReconstructionKind::ALL {
        let rows: Vec<_> = report.rows_for(kind).collect();
        if rows.is_empty() {
            continue;
        }

        println!();
        println!("Reconstruction: {kind}");
        println!(
            "{:^10} | {:^10} | {:^12} | {:^12} | {:^12}",
            "Samples", "Sampling", "Integral", "Abs. error", "Rel. [%]"
        );
        println!("{}", "-".repeat(66));

        let mut last_count = None;
        for row in rows {
            if last_count.is_some_and(|n| n != row.sample_count) {
                println!("{}", "-".repeat(66));
            }
            last_count = Some(row.sample_count);
            println!(
                "{:^10} | {:^10} | {:.4e}   | {:.4e}   | {:^12.4}",
                row.sample_count,
                row.adc.label(),
                row.integral,
                row.metrics.absolute,
                row.metrics.relative_percent
            );
        }
    }
}

pub fn print_worst_case_table(rows: &[WorstCaseRow]) {
    println!("Worst-Case Relative Error Over Phase");
    println!("====================================");

    let mut last_amplitude = None;
    for row in rows {
        if last_amplitude != Some(row.amplitude) {
            last_amplitude = Some(row.amplitude);
            println!();
            println!("Amplitude: {}", format_quantity(row.amplitude, "V"));
            println!(
                "{:^8} | {:^8} | {:^8} | {:^12} | {:^8} | {:^6}",
                "Samples", "ADC", "Path", "Max rel. [%]", "Phase", "Failed"
            );
            println!("{}", "-".repeat(65));
        }

        let (max, phase) = match (row.max_relative_percent, row.phase_degrees) {
            (Some(max), Some(phase)) => (format!("{max:.4}"), format!("{phase}")),
            _ => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:^8} | {:^8} | {:^8} | {:^12} | {:^8} | {:^6}",
            row.sample_count, row.adc, row.reconstruction, max, phase, row.failed_cells
        );
    }
}

/// One table per (amplitude, sample count, ADC) with a column per path.
pub fn print_phase_table(report: &SweepReport, series: &[&SeriesKey]) {
    println!("Relative Error [%] vs Sampling Phase");
    println!("====================================");

    let mut groups: Vec<Vec<&SeriesKey>> = Vec::new();
    for &key in series {
        match groups.last_mut() {
            Some(group)
                if group[0].amplitude == key.amplitude
                    && group[0].sample_count == key.sample_count
                    && group[0].adc == key.adc =>
            {
                group.push(key)
            }
            _ => groups.push(vec![key]),
        }
    }

    for group in groups {
        let head = group[0];
        println!();
        println!(
            "A = {}, {} samples, {}",
            format_quantity(head.amplitude, "V"),
            head.sample_count,
            head.adc
        );

        let columns: Vec<_> = group.iter().map(|key| report.phase_series(key)).collect();
        let mut header = format!("{:>8}", "Phase");
        for key in &group {
            header.push_str(&format!(" | {:>10}", key.reconstruction.label()));
        }
        println!("{header}");
        println!("{}", "-".repeat(header.len()));

        for (phase, values) in align_by_phase(&columns) {
            let mut line = format!("{phase:>8}");
            for value in values {
                match value {
                    Some(v) => line.push_str(&format!(" | {v:>10.4}")),
                    None => line.push_str(&format!(" | {:>10}", "-")),
                }
            }
            println!("{line}");
        }
    }
}

/// Join per-path phase series on their phase; a path without a value at some
/// phase gets `None` in that row.
fn align_by_phase(columns: &[Vec<PhaseError>]) -> Vec<(f64, Vec<Option<f64>>)> {
    let mut phases: Vec<f64> = columns
        .iter()
        .flatten()
        .map(|e| e.phase_degrees)
        .collect();
    phases.sort_by(f64::total_cmp);
    phases.dedup();

    phases
        .into_iter()
        .map(|phase| {
            let values = columns
                .iter()
                .map(|column| {
                    column
                        .iter()
                        .find(|e| e.phase_degrees == phase)
                        .map(|e| e.relative_percent)
                })
                .collect();
            (phase, values)
        })
        .collect()
}
