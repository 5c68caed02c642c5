//! CLI command implementations.

mod benchmark;
mod qualify;

pub use benchmark::{benchmark, BenchmarkArgs};
pub use qualify::{qualify, QualifyArgs};

use anyhow::{anyhow, Result};
use flashqual_core::device::{FileFlash, MemFlash};
use flashqual_core::{parse_size, FlashGeometry};

/// Device selection shared by both subcommands.
#[derive(clap::Args)]
pub struct DeviceArgs {
    /// Flash image file to operate on. Omit to use an in-memory
    /// simulated device.
    #[arg(short, long)]
    pub image: Option<std::path::PathBuf>,

    /// Declared flash capacity (e.g., "8M").
    #[arg(short, long, default_value = "8M")]
    pub size: String,

    /// Erase block size (e.g., "4K").
    #[arg(short, long, default_value = "4K")]
    pub block_size: String,

    /// Program page size.
    #[arg(short, long, default_value = "256")]
    pub page_size: String,
}

/// Either backend, dispatched by the commands.
pub enum Backend {
    /// File-backed flash image.
    File(FileFlash),
    /// In-memory simulation.
    Mem(MemFlash),
}

impl DeviceArgs {
    /// Parse and validate the geometry arguments.
    pub fn geometry(&self) -> Result<FlashGeometry> {
        let flash_size = parse_size(&self.size)?;
        let block_size = usize::try_from(parse_size(&self.block_size)?)?;
        let page_size = usize::try_from(parse_size(&self.page_size)?)?;
        Ok(FlashGeometry::new(flash_size, block_size, page_size)?)
    }

    /// Open the requested backend.
    pub fn open(&self, geometry: &FlashGeometry) -> Result<Backend> {
        match &self.image {
            Some(path) => {
                let device = FileFlash::open(path, geometry.block_size)?;
                Ok(Backend::File(device))
            }
            None => {
                let device = MemFlash::new(geometry.flash_size, geometry.block_size)
                    .map_err(|e| anyhow!("simulated device: {e}"))?;
                Ok(Backend::Mem(device))
            }
        }
    }
}
