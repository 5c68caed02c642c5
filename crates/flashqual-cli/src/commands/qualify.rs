//! Qualify command: capacity probe plus exhaustive block sweep.

use anyhow::Result;
use clap::Args;
use flashqual_core::{format_size, run_qualification};

use super::{Backend, DeviceArgs};

/// Arguments for the qualify command.
#[derive(Args)]
pub struct QualifyArgs {
    /// Device and geometry selection.
    #[command(flatten)]
    pub device: DeviceArgs,
}

/// Run the full qualification and print the verdict.
///
/// Returns whether the device passed, which decides the exit status.
pub fn qualify(args: &QualifyArgs) -> Result<bool> {
    let geometry = args.device.geometry()?;

    println!(
        "Qualifying {} of flash ({} blocks of {})",
        format_size(geometry.flash_size),
        geometry.block_count(),
        format_size(geometry.block_size as u64),
    );

    let mut backend = args.device.open(&geometry)?;
    let outcome = match &mut backend {
        Backend::File(device) => run_qualification(device, &geometry),
        Backend::Mem(device) => run_qualification(device, &geometry),
    };

    println!("{outcome}");
    Ok(outcome.success)
}
