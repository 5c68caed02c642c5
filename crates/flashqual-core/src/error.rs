//! Error types for flashqual-core.

use thiserror::Error;

/// Errors that can occur while qualifying or benchmarking a device.
#[derive(Debug, Error)]
pub enum Error {
    /// The device transport rejected or failed an operation.
    #[error("{op} transport error: {detail}")]
    Transport {
        /// Operation that failed ("erase", "write", "read", "size").
        op: &'static str,
        /// Backend-specific failure description.
        detail: String,
    },

    /// The device reported an erased length different from the request.
    #[error("erase reported {got} bytes, expected {want}")]
    EraseSizeMismatch {
        /// Bytes the device claims to have erased.
        got: usize,
        /// Bytes requested.
        want: usize,
    },

    /// The device reported a read length different from the request.
    #[error("read reported {got} bytes, expected {want}")]
    ReadSizeMismatch {
        /// Bytes the device claims to have read.
        got: usize,
        /// Bytes requested.
        want: usize,
    },

    /// Read-back bytes differ from the reference pattern.
    #[error("content mismatch in block at 0x{addr:x}")]
    ContentMismatch {
        /// Base address of the failing block.
        addr: u64,
    },

    /// Wrap-around probing found a different capacity than configured.
    #[error("detected capacity {detected} bytes, expected {expected}")]
    CapacityMismatch {
        /// Capacity the probe actually found.
        detected: u64,
        /// Capacity the configuration declared.
        expected: u64,
    },

    /// Geometry constants fail their structural invariants.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The timer capability failed to produce a timestamp.
    #[error("timer error: {0}")]
    Timer(String),

    /// I/O error from a file-backed device.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for qualification operations.
pub type Result<T> = std::result::Result<T, Error>;
