//! Timed single-operation loops producing latency samples.
//!
//! Sampling bypasses content verification entirely; it records timestamps
//! around exactly one device operation per iteration.

use serde::Serialize;
use tracing::warn;

use crate::device::BlockDevice;
use crate::pattern::ReferencePattern;
use crate::timer::{timestamp, Timer};
use crate::{Error, FlashGeometry, Result};

/// Device operation kind being benchmarked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Block erase.
    Erase,
    /// Full block write, looped by page.
    Write,
    /// Full block read.
    Read,
}

impl OpKind {
    /// Parse one operation kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "erase" => Some(Self::Erase),
            "write" => Some(Self::Write),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// Name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Erase => "erase",
            Self::Write => "write",
            Self::Read => "read",
        }
    }
}

/// Parse an operation selection ("erase", "write", "read", "all").
#[must_use]
pub fn parse_ops(s: &str) -> Option<Vec<OpKind>> {
    if s.eq_ignore_ascii_case("all") {
        Some(vec![OpKind::Erase, OpKind::Write, OpKind::Read])
    } else {
        OpKind::parse(s).map(|op| vec![op])
    }
}

/// Start/end timestamp pair for one operation invocation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Sample {
    /// Timestamp before the call, in nanoseconds.
    pub start_ns: u64,
    /// Timestamp after the call returned, in nanoseconds.
    pub end_ns: u64,
}

impl Sample {
    /// Duration of the call in nanoseconds.
    #[must_use]
    pub fn delta_ns(&self) -> u64 {
        self.end_ns.saturating_sub(self.start_ns)
    }
}

/// Time `block_count` invocations of one operation kind.
///
/// Iteration `i` targets the block at `i * block_size`. Erase and read
/// failures abort the run; write failures are logged and sampling
/// continues (the write path has always been permissive here). Timer
/// failures degrade to zero timestamps.
///
/// # Errors
///
/// Returns the first erase or read failure, including short lengths.
pub fn sample_operation(
    device: &mut impl BlockDevice,
    timer: &mut impl Timer,
    op: OpKind,
    geometry: &FlashGeometry,
    block_count: u64,
) -> Result<Vec<Sample>> {
    let block_size = geometry.block_size;
    let page_size = geometry.page_size;
    let fill = ReferencePattern::Fill.buffer(page_size);
    let mut samples = Vec::with_capacity(usize::try_from(block_count).unwrap_or(0));

    for i in 0..block_count {
        let addr = i * block_size as u64;
        let start = timestamp(timer);

        match op {
            OpKind::Erase => {
                let erased = device.erase(addr, block_size)?;
                if erased != block_size {
                    return Err(Error::EraseSizeMismatch {
                        got: erased,
                        want: block_size,
                    });
                }
            }
            OpKind::Write => {
                for page in 0..geometry.pages_per_block() {
                    let page_addr = addr + (page * page_size) as u64;
                    device.transfer_buf()[..page_size].copy_from_slice(&fill);
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
            }
            OpKind::Read => {
                let got = device.read(addr, block_size)?;
                if got != block_size {
                    return Err(Error::ReadSizeMismatch {
                        got,
                        want: block_size,
                    });
                }
            }
        }

        let end = timestamp(timer);
        samples.push(Sample {
            start_ns: start,
            end_ns: end,
        });
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemFlash;
    use crate::timer::SystemTimer;

    const BLOCK: usize = 4096;
    const PAGE: usize = 256;

    fn setup(blocks: u64) -> (MemFlash, FlashGeometry, SystemTimer) {
        let capacity = blocks * BLOCK as u64;
        let geometry = FlashGeometry::new(capacity, BLOCK, PAGE).unwrap();
        let device = MemFlash::new(capacity, BLOCK).unwrap();
        (device, geometry, SystemTimer::new())
    }

    #[test]
    fn test_sample_counts_match_request() {
        let (mut device, geometry, mut timer) = setup(8);
        for op in [OpKind::Erase, OpKind::Write, OpKind::Read] {
            let samples = sample_operation(&mut device, &mut timer, op, &geometry, 8).unwrap();
            assert_eq!(samples.len(), 8);
            for s in &samples {
                assert!(s.end_ns >= s.start_ns);
            }
        }
    }

    #[test]
    fn test_sample_order_is_invocation_order() {
        let (mut device, geometry, mut timer) = setup(4);
        let samples =
            sample_operation(&mut device, &mut timer, OpKind::Erase, &geometry, 4).unwrap();
        for pair in samples.windows(2) {
            assert!(pair[1].start_ns >= pair[0].start_ns);
        }
    }

    #[test]
    fn test_erase_failure_aborts_run() {
        let (mut device, geometry, mut timer) = setup(4);
        device.fail_erases(true);
        let err =
            sample_operation(&mut device, &mut timer, OpKind::Erase, &geometry, 4).unwrap_err();
        assert!(matches!(err, Error::Transport { op: "erase", .. }));
    }

    #[test]
    fn test_read_failure_aborts_run() {
        let (mut device, geometry, mut timer) = setup(4);
        device.fail_reads(true);
        let err =
            sample_operation(&mut device, &mut timer, OpKind::Read, &geometry, 4).unwrap_err();
        assert!(matches!(err, Error::Transport { op: "read", .. }));
    }

    #[test]
    fn test_write_failure_does_not_abort_run() {
        let (mut device, geometry, mut timer) = setup(4);
        device.fail_writes(true);
        let samples =
            sample_operation(&mut device, &mut timer, OpKind::Write, &geometry, 4).unwrap();
        assert_eq!(samples.len(), 4);
    }

    #[test]
    fn test_parse_ops() {
        assert_eq!(OpKind::parse("erase"), Some(OpKind::Erase));
        assert_eq!(OpKind::parse("READ"), Some(OpKind::Read));
        assert_eq!(OpKind::parse("bogus"), None);
        assert_eq!(
            parse_ops("all").unwrap(),
            vec![OpKind::Erase, OpKind::Write, OpKind::Read]
        );
        assert_eq!(parse_ops("write").unwrap(), vec![OpKind::Write]);
        assert!(parse_ops("nope").is_none());
    }
}
