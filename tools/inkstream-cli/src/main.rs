//! Inkstream CLI — Command-line interface for the stylus sample pipeline.
//!
//! Usage:
//!   inkstream stream [OPTIONS]    Run a live simulated session
//!   inkstream record [OPTIONS]    Record a simulated session to a log
//!   inkstream derive <PATH>       Derive motion series from a sample log
//!   inkstream info <PATH>         Show sample log information

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "inkstream",
    about = "Real-time stylus telemetry: ingestion, fan-out, and kinematic derivation",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live simulated session through the broker
    Stream {
        /// Producer sample rate (Hz)
        #[arg(long, default_value = "60")]
        rate: u32,

        /// Session duration in seconds (0 = until Ctrl+C)
        #[arg(long, default_value = "10")]
        duration: u64,

        /// Derivation mode: position|velocity|velocity10|velocity100|
        /// acceleration|acceleration10|acceleration100 (or any windowed
        /// velocityN/accelerationN). Defaults to the configured mode.
        #[arg(long)]
        mode: Option<String>,

        /// Trailing display window in seconds (0 = all data). Defaults to
        /// the configured window.
        #[arg(long)]
        window_secs: Option<i64>,

        /// Show all retained data instead of a trailing window
        #[arg(long)]
        all: bool,

        /// Retention capacity of the sample buffer
        #[arg(long)]
        capacity: Option<usize>,

        /// Per-subscriber queue depth (0 = match capacity)
        #[arg(long)]
        queue_depth: Option<usize>,

        /// Consecutive drops before a subscriber is detached
        #[arg(long)]
        drop_threshold: Option<u32>,
    },

    /// Record a simulated session to a JSONL sample log
    Record {
        /// Output file path
        #[arg(short, long, default_value = "samples.jsonl")]
        output: PathBuf,

        /// Producer sample rate (Hz)
        #[arg(long, default_value = "60")]
        rate: u32,

        /// Recording duration in seconds
        #[arg(long, default_value = "10")]
        duration: u64,

        /// Positional noise amplitude (meters)
        #[arg(long, default_value = "0.05")]
        noise: f64,

        /// Noise RNG seed
        #[arg(long, default_value = "24397")]
        seed: u64,
    },

    /// Derive motion series from a recorded sample log
    Derive {
        /// Path to the sample log
        path: PathBuf,

        /// Derivation mode (see `stream`)
        #[arg(long, default_value = "velocity")]
        mode: String,

        /// Trailing window in seconds, relative to the last sample
        #[arg(long, default_value = "0")]
        window_secs: i64,

        /// Output file path (JSONL); prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show sample log information
    Info {
        /// Path to the sample log
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    inkstream_common::logging::init_logging(&inkstream_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Stream {
            rate,
            duration,
            mode,
            window_secs,
            all,
            capacity,
            queue_depth,
            drop_threshold,
        } => {
            commands::stream::run(
                rate,
                duration,
                mode,
                window_secs,
                all,
                capacity,
                queue_depth,
                drop_threshold,
            )
            .await
        }
        Commands::Record {
            output,
            rate,
            duration,
            noise,
            seed,
        } => commands::record::run(output, rate, duration, noise, seed).await,
        Commands::Derive {
            path,
            mode,
            window_secs,
            output,
        } => commands::derive::run(path, mode, window_secs, output),
        Commands::Info { path } => commands::info::run(path),
    }
}
