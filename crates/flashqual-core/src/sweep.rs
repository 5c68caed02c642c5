//! Exhaustive per-block verification across the declared capacity.

use tracing::info;

use crate::device::BlockDevice;
use crate::pattern::PatternBuffers;
use crate::verify::verify_block;
use crate::{Error, FlashGeometry};

/// Emit a progress line every this many blocks.
const PROGRESS_INTERVAL: u64 = 50;

/// A sweep stopped at its first failing block.
#[derive(Debug, thiserror::Error)]
#[error("block at 0x{failing_address:x} failed: {source}")]
pub struct SweepError {
    /// Base address of the first block that failed.
    pub failing_address: u64,
    /// The verification error that stopped the sweep.
    #[source]
    pub source: Error,
}

/// Verify every block from address 0 to the declared capacity.
///
/// Each block is erased, programmed, and read back via
/// [`verify_block`], then erased once more with an erased-length check so
/// the media is left blank. Stops at the first failure.
///
/// # Errors
///
/// Returns [`SweepError`] carrying the failing block address.
pub fn sweep_all(
    device: &mut impl BlockDevice,
    geometry: &FlashGeometry,
) -> std::result::Result<(), SweepError> {
    let patterns = PatternBuffers::new(geometry.block_size);
    let block_size = geometry.block_size;
    let total = geometry.block_count();

    info!(total, "testing every memory block");
    for block in 0..total {
        let addr = block * block_size as u64;
        if block % PROGRESS_INTERVAL == 0 {
            info!(block, total, "verifying block");
        }

        verify_block(device, geometry, addr, &patterns.erased, &patterns.fill).map_err(
            |source| SweepError {
                failing_address: addr,
                source,
            },
        )?;

        let erased = device
            .erase(addr, block_size)
            .map_err(|source| SweepError {
                failing_address: addr,
                source,
            })?;
        if erased != block_size {
            return Err(SweepError {
                failing_address: addr,
                source: Error::EraseSizeMismatch {
                    got: erased,
                    want: block_size,
                },
            });
        }
    }
    info!(total, "all blocks verified");
    Ok(())
}
