//! flashqual CLI - NOR flash qualification and benchmarking.

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]

mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// flashqual: NOR flash qualification and benchmarking
#[derive(Parser)]
#[command(name = "flashqual")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect capacity and verify every block
    Qualify(commands::QualifyArgs),

    /// Measure per-operation latency and throughput
    Benchmark(commands::BenchmarkArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Qualify(args) => commands::qualify(&args),
        Commands::Benchmark(args) => commands::benchmark(&args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
