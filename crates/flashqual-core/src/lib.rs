//! NOR flash qualification and benchmarking engine.
//!
//! This crate detects the usable capacity of a block-erasable flash-like
//! device through address wrap-around, exhaustively verifies that every
//! block erases, programs, and reads back correctly, and times individual
//! erase/write/read operations.
//!
//! # Example
//!
//! ```
//! use flashqual_core::{device::MemFlash, run_qualification, FlashGeometry};
//!
//! let geometry = FlashGeometry::new(1 << 20, 4096, 256).unwrap();
//! let mut device = MemFlash::new(geometry.flash_size, geometry.block_size).unwrap();
//!
//! let outcome = run_qualification(&mut device, &geometry);
//! assert!(outcome.success);
//! ```

#![deny(missing_docs)]
#![deny(clippy::panic)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod device;
mod error;
mod geometry;
mod pattern;
mod perf;
mod probe;
mod report;
mod sweep;
mod timer;
mod verify;

pub use error::{Error, Result};
pub use geometry::{format_size, parse_size, FlashGeometry};
pub use pattern::{PatternBuffers, ReferencePattern};
pub use perf::{parse_ops, sample_operation, OpKind, Sample};
pub use probe::probe_capacity;
pub use report::{sample_table, PerfSummary, QualificationOutcome};
pub use sweep::{sweep_all, SweepError};
pub use timer::{SystemTimer, Timer};
pub use verify::{read_validate, verify_block};

use tracing::{info, warn};

use device::BlockDevice;

/// Run the full qualification: capacity probe, then exhaustive sweep.
///
/// The probe runs first; a capacity mismatch or probe failure skips the
/// sweep. The returned outcome is what the CLI reports and what decides
/// the process exit status.
pub fn run_qualification(
    device: &mut impl BlockDevice,
    geometry: &FlashGeometry,
) -> QualificationOutcome {
    info!(
        expected = %format_size(geometry.flash_size),
        "starting NOR flash qualification"
    );

    let detected = match probe_capacity(device, geometry) {
        Ok(detected) => detected,
        Err(Error::CapacityMismatch { detected, expected }) => {
            warn!(detected, expected, "capacity mismatch");
            return QualificationOutcome {
                success: false,
                failing_address: None,
                detected_capacity: Some(detected),
            };
        }
        Err(e) => {
            warn!(error = %e, "capacity probe failed");
            return QualificationOutcome {
                success: false,
                failing_address: None,
                detected_capacity: None,
            };
        }
    };

    match sweep_all(device, geometry) {
        Ok(()) => QualificationOutcome {
            success: true,
            failing_address: None,
            detected_capacity: Some(detected),
        },
        Err(e) => {
            warn!(failing_address = e.failing_address, error = %e.source, "block sweep failed");
            QualificationOutcome {
                success: false,
                failing_address: Some(e.failing_address),
                detected_capacity: Some(detected),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::MemFlash;

    const BLOCK: usize = 4096;
    const PAGE: usize = 256;

    #[test]
    fn test_qualification_healthy_device() {
        let capacity = 8 * BLOCK as u64;
        let geometry = FlashGeometry::new(capacity, BLOCK, PAGE).unwrap();
        let mut device = MemFlash::new(capacity, BLOCK).unwrap();

        let outcome = run_qualification(&mut device, &geometry);
        assert!(outcome.success);
        assert_eq!(outcome.detected_capacity, Some(capacity));
        assert_eq!(outcome.failing_address, None);
    }

    #[test]
    fn test_qualification_capacity_mismatch_skips_sweep() {
        let geometry = FlashGeometry::new(16 * BLOCK as u64, BLOCK, PAGE).unwrap();
        let mut device = MemFlash::new(4 * BLOCK as u64, BLOCK).unwrap();

        let outcome = run_qualification(&mut device, &geometry);
        assert!(!outcome.success);
        assert_eq!(outcome.detected_capacity, Some(4 * BLOCK as u64));
        assert_eq!(outcome.failing_address, None);
    }

    #[test]
    fn test_qualification_reports_failing_block() {
        let capacity = 8 * BLOCK as u64;
        let geometry = FlashGeometry::new(capacity, BLOCK, PAGE).unwrap();
        let mut device = MemFlash::new(capacity, BLOCK).unwrap();
        // Poison a block the probe never touches (not a power of two
        // multiple of the block size) so only the sweep can see it.
        let bad_addr = 3 * BLOCK as u64;
        device.poison_block(bad_addr);

        let outcome = run_qualification(&mut device, &geometry);
        assert!(!outcome.success);
        assert_eq!(outcome.detected_capacity, Some(capacity));
        assert_eq!(outcome.failing_address, Some(bad_addr));
    }
}
