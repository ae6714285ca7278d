//! Command-line argument parsing for Orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Orrery orbital simulation")]
pub struct CliArgs {
    /// Kepler solver residual tolerance.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Kepler solver iteration cap.
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Time scale applied to every body (negative runs backwards).
    #[arg(long, allow_negative_numbers = true)]
    pub time_scale: Option<f64>,

    /// Simulated seconds to run.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Generator seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stepping threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(tolerance) = args.tolerance {
            self.solver.tolerance = tolerance;
        }
        if let Some(max_iterations) = args.max_iterations {
            self.solver.max_iterations = max_iterations;
        }
        if let Some(time_scale) = args.time_scale {
            self.simulation.time_scale = time_scale;
        }
        if let Some(duration) = args.duration {
            self.simulation.duration_seconds = duration;
        }
        if let Some(seed) = args.seed {
            self.generator.seed = seed;
        }
        if let Some(workers) = args.workers {
            self.simulation.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
