//! digipulse command-line interface.

mod analysis;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use digipulse_core::units::parse_quantity;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "digipulse")]
#[command(about = "Digitization error study for photomultiplier pulses", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compare sampling and reconstruction paths over a single window
    Study(StudyArgs),
    /// Worst-case error search over amplitudes and sampling phases
    Sweep(SweepArgs),
    /// Relative error against sampling phase for one amplitude
    PhaseScan(PhaseScanArgs),
    /// Dump the ideal curve, samples and reconstructions as JSON
    Waveform(WaveformArgs),
}

#[derive(Args)]
struct StudyArgs {
    /// JSON study configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the rise-time demo window instead of the default study
    #[arg(long, conflicts_with = "config")]
    rise_time_demo: bool,

    /// Print rows as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SweepArgs {
    /// JSON sweep configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pulse rise time, e.g. 3ns
    #[arg(long, value_parser = parse_si)]
    rise_time: Option<f64>,

    /// Phase step in degrees
    #[arg(long)]
    phase_step: Option<f64>,

    /// Record failing cells instead of aborting
    #[arg(long)]
    record_failures: bool,

    /// Disable parallel execution
    #[arg(long)]
    sequential: bool,

    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PhaseScanArgs {
    /// Pulse amplitude, e.g. 0.6 or 600mV
    #[arg(short, long, default_value = "0.6", value_parser = parse_si)]
    amplitude: f64,

    /// Pulse rise time, e.g. 3ns
    #[arg(long, value_parser = parse_si)]
    rise_time: Option<f64>,

    /// Phase step in degrees
    #[arg(long, default_value_t = 3.0)]
    phase_step: f64,

    /// Only show this sample count
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Print series as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct WaveformArgs {
    /// JSON study configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Use the rise-time demo window instead of the default study
    #[arg(long, conflicts_with = "config")]
    rise_time_demo: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Parse a number with an optional SI prefix and unit.
fn parse_si(s: &str) -> std::result::Result<f64, String> {
    parse_quantity(s).ok_or_else(|| format!("invalid value '{s}'"))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Study(args) => {
            let config = analysis::study_config(args.config.as_deref(), args.rise_time_demo)?;
            analysis::run_study_command(&config, args.json)
        }
        Command::Sweep(args) => {
            let config = analysis::sweep_config(
                args.config.as_deref(),
                args.rise_time,
                args.phase_step,
                args.record_failures,
                args.sequential,
            )?;
            analysis::run_sweep_command(&config, args.json)
        }
        Command::PhaseScan(args) => analysis::run_phase_scan(
            args.amplitude,
            args.rise_time,
            args.phase_step,
            args.samples,
            args.json,
        ),
        Command::Waveform(args) => {
            let config = analysis::study_config(args.config.as_deref(), args.rise_time_demo)?;
            analysis::run_waveform_dump(&config, args.output.as_deref())
        }
    }
}
