//! Capacity detection via address wrap-around.
//!
//! NOR flash capacity is always a power of two, and writing past the true
//! end of the media lands back at address 0. The probe writes a sentinel
//! to block 0, then verifies blocks at exponentially growing addresses;
//! the first address whose verification destroys the sentinel (or fails
//! outright) is the real capacity.

use tracing::{debug, info};

use crate::device::BlockDevice;
use crate::pattern::PatternBuffers;
use crate::verify::{read_validate, verify_block};
use crate::{format_size, Error, FlashGeometry, Result};

/// Detect the usable capacity of the device.
///
/// Probing is bounded by the larger of the configured capacity and the
/// device-reported size, so the detected value is a property of the media
/// alone. The sentinel block and every probed block are left programmed.
///
/// # Errors
///
/// Returns [`Error::CapacityMismatch`] (carrying the detected value) when
/// detection disagrees with `geometry.flash_size`, or the underlying
/// verification error if the block 0 sentinel cannot be established.
pub fn probe_capacity(device: &mut impl BlockDevice, geometry: &FlashGeometry) -> Result<u64> {
    let patterns = PatternBuffers::new(geometry.block_size);
    let block_size = geometry.block_size as u64;

    info!("detecting available memory size");
    verify_block(device, geometry, 0, &patterns.erased, &patterns.marker)?;

    let reported = device.size()?;
    let limit = reported.max(geometry.flash_size);
    let max_exp = (limit / block_size).max(1).ilog2();

    let mut detected = 0u64;
    for exp in 0..=max_exp {
        let addr = block_size << exp;
        detected = addr;
        info!(candidate = %format_size(addr), "testing memory size");

        if let Err(e) = verify_block(device, geometry, addr, &patterns.erased, &patterns.fill) {
            debug!(addr, error = %e, "probe block failed");
            break;
        }
        if read_validate(device, 0, &patterns.marker).is_err() {
            debug!(addr, "block 0 sentinel overwritten, wrap-around detected");
            break;
        }
    }

    info!(detected = %format_size(detected), "detected memory size");
    if detected == geometry.flash_size {
        Ok(detected)
    } else {
        Err(Error::CapacityMismatch {
            detected,
            expected: geometry.flash_size,
        })
    }
}
