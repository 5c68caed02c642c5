//! Single-block erase/program/verify routine.
//!
//! This is the only code that touches the device data path; the capacity
//! probe and the full sweep both compose it per block.

use tracing::warn;

use crate::device::BlockDevice;
use crate::{Error, FlashGeometry, Result};

/// Read `expected.len()` bytes at `addr` and compare against `expected`.
///
/// # Errors
///
/// Returns [`Error::ReadSizeMismatch`] when the device reports a short
/// read and [`Error::ContentMismatch`] when the bytes differ.
pub fn read_validate(device: &mut impl BlockDevice, addr: u64, expected: &[u8]) -> Result<()> {
    let got = device.read(addr, expected.len())?;
    if got != expected.len() {
        return Err(Error::ReadSizeMismatch {
            got,
            want: expected.len(),
        });
    }
    if device.transfer_buf()[..expected.len()] != *expected {
        return Err(Error::ContentMismatch { addr });
    }
    Ok(())
}

/// Erase, program, and verify one block.
///
/// Erases `[addr, addr + block_size)`, checks it reads back as `empty`,
/// programs `fill` page by page, and checks it reads back as `fill`.
/// Individual page-write failures are logged and do not abort the loop;
/// the trailing read-back still catches any block they actually damaged.
///
/// # Errors
///
/// Returns the first erase or read-back error.
pub fn verify_block(
    device: &mut impl BlockDevice,
    geometry: &FlashGeometry,
    addr: u64,
    empty: &[u8],
    fill: &[u8],
) -> Result<()> {
    let block_size = geometry.block_size;
    let erased = device.erase(addr, block_size)?;
    if erased != block_size {
        return Err(Error::EraseSizeMismatch {
            got: erased,
            want: block_size,
        });
    }

    read_validate(device, addr, empty)?;

    let page_size = geometry.page_size;
    for page in 0..geometry.pages_per_block() {
        let page_addr = addr + (page * page_size) as u64;
        device.transfer_buf()[..page_size].copy_from_slice(&fill[..page_size]);
        match device.write(page_addr, page_size) {
            Ok(written) if written == page_size => {}
            Ok(written) => {
                warn!(addr = page_addr, written, expected = page_size, "short page write");
            }
            Err(e) => {
                warn!(addr = page_addr, error = %e, "page write failed");
            }
        }
    }

    read_validate(device, addr, fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemFlash;
    use crate::pattern::PatternBuffers;

    const BLOCK: usize = 4096;
    const PAGE: usize = 256;

    fn setup() -> (MemFlash, FlashGeometry, PatternBuffers) {
        let geometry = FlashGeometry::new(4 * BLOCK as u64, BLOCK, PAGE).unwrap();
        let device = MemFlash::new(geometry.flash_size, BLOCK).unwrap();
        (device, geometry, PatternBuffers::new(BLOCK))
    }

    #[test]
    fn test_verify_block_healthy() {
        let (mut device, geometry, patterns) = setup();
        verify_block(&mut device, &geometry, 0, &patterns.erased, &patterns.fill).unwrap();
        // Block left programmed with the fill pattern.
        assert!(device.media()[..BLOCK].iter().all(|&b| b == 0xA5));
    }

    #[test]
    fn test_verify_block_poisoned() {
        let (mut device, geometry, patterns) = setup();
        device.poison_block(BLOCK as u64);
        let err = verify_block(
            &mut device,
            &geometry,
            BLOCK as u64,
            &patterns.erased,
            &patterns.fill,
        )
        .unwrap_err();
        // Stuck bit shows up in the erased-pattern check first.
        assert!(matches!(
            err,
            Error::ContentMismatch { addr } if addr == BLOCK as u64
        ));
    }

    #[test]
    fn test_verify_block_erase_failure_is_fatal() {
        let (mut device, geometry, patterns) = setup();
        device.fail_erases(true);
        let err =
            verify_block(&mut device, &geometry, 0, &patterns.erased, &patterns.fill).unwrap_err();
        assert!(matches!(err, Error::Transport { op: "erase", .. }));
    }

    #[test]
    fn test_verify_block_write_failure_caught_by_readback() {
        let (mut device, geometry, patterns) = setup();
        // Erase succeeds, every page write fails; the block stays erased,
        // so the fill-pattern read-back must flag it.
        device.fail_writes(true);
        let err =
            verify_block(&mut device, &geometry, 0, &patterns.erased, &patterns.fill).unwrap_err();
        assert!(matches!(err, Error::ContentMismatch { addr: 0 }));
    }

    #[test]
    fn test_read_validate_mismatch_reports_address() {
        let (mut device, _geometry, patterns) = setup();
        device.transfer_buf()[..PAGE].fill(0x00);
        device.write(0, PAGE).unwrap();
        let err = read_validate(&mut device, 0, &patterns.erased).unwrap_err();
        assert!(matches!(err, Error::ContentMismatch { addr: 0 }));
    }

    #[test]
    fn test_read_validate_ok() {
        let (mut device, _geometry, patterns) = setup();
        read_validate(&mut device, 0, &patterns.erased).unwrap();
    }
}
