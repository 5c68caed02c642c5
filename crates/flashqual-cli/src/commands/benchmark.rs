//! Benchmark command: per-operation latency and throughput sampling.

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use flashqual_core::{
    parse_ops, sample_operation, sample_table, PerfSummary, SystemTimer,
};
use tracing::warn;

use super::{Backend, DeviceArgs};

/// Output format for benchmark results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Per-sample table plus summary lines.
    #[default]
    Table,
    /// JSON summaries.
    Json,
}

/// Arguments for the benchmark command.
#[derive(Args)]
pub struct BenchmarkArgs {
    /// Device and geometry selection.
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Operation to benchmark (erase, write, read, all).
    #[arg(short, long, default_value = "all")]
    pub op: String,

    /// Number of blocks to test per operation.
    #[arg(short = 'n', long, default_value = "100")]
    pub blocks: u64,

    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Run the sampling loops and print the results.
///
/// Returns `true` unless a sampling run aborted.
pub fn benchmark(args: &BenchmarkArgs) -> Result<bool> {
    let geometry = args.device.geometry()?;
    let ops = parse_ops(&args.op).ok_or_else(|| anyhow!("unknown operation: {}", args.op))?;

    let mut blocks = args.blocks;
    if blocks > geometry.block_count() {
        warn!(
            requested = args.blocks,
            available = geometry.block_count(),
            "clamping block count to device capacity"
        );
        blocks = geometry.block_count();
    }

    let mut backend = args.device.open(&geometry)?;
    let mut timer = SystemTimer::new();
    let mut summaries = Vec::with_capacity(ops.len());

    for op in ops {
        let samples = match &mut backend {
            Backend::File(device) => sample_operation(device, &mut timer, op, &geometry, blocks)?,
            Backend::Mem(device) => sample_operation(device, &mut timer, op, &geometry, blocks)?,
        };
        let summary = PerfSummary::from_samples(op, &samples, &geometry);

        if matches!(args.format, OutputFormat::Table) {
            println!("# {} ({} blocks)", op.name(), blocks);
            print!("{}", sample_table(&samples));
            println!("{summary}");
            println!();
        }
        summaries.push(summary);
    }

    if matches!(args.format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    Ok(true)
}
