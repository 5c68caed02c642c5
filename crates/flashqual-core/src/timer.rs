//! Timer capability for latency sampling.

use std::time::Instant;

use tracing::debug;

use crate::Result;

/// Nanosecond timestamp source.
///
/// Supplied by the caller so benchmarks can run against a deterministic
/// clock in tests.
pub trait Timer {
    /// Current monotonic time in nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Timer`] if the clock cannot be read.
    fn now_ns(&mut self) -> Result<u64>;
}

/// Monotonic timer anchored at its construction instant.
#[derive(Debug)]
pub struct SystemTimer {
    origin: Instant,
}

impl SystemTimer {
    /// Create a timer starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for SystemTimer {
    fn now_ns(&mut self) -> Result<u64> {
        Ok(u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }
}

/// Read a timestamp, degrading to zero on failure.
///
/// Timer failures are non-fatal to a sampling run.
pub(crate) fn timestamp(timer: &mut impl Timer) -> u64 {
    match timer.now_ns() {
        Ok(ns) => ns,
        Err(e) => {
            debug!(error = %e, "timestamp read failed, recording 0");
            0
        }
    }
}
