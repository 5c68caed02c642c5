//! Block device abstraction and its backends.
//!
//! The engine never talks to storage directly; it goes through
//! [`BlockDevice`], which models a block-erasable NOR-flash-like backend
//! with a shared transfer buffer. Write payloads are staged into the
//! buffer before the call; read results land in the same buffer. This
//! keeps the logic testable without a real device.

mod file;
mod mem;

pub use file::FileFlash;
pub use mem::MemFlash;

use crate::Result;

/// Capability handle for a block-erasable storage backend.
///
/// Addresses must be block-aligned for [`erase`](Self::erase) and
/// page-aligned for [`write`](Self::write). One operation is in flight at
/// a time; the transfer buffer belongs to the current operation only.
pub trait BlockDevice {
    /// Erase `len` bytes starting at `addr`, returning the erased length
    /// the backend reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    fn erase(&mut self, addr: u64, len: usize) -> Result<usize>;

    /// Program `len` bytes from the transfer buffer to `addr`, returning
    /// the written length the backend reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    fn write(&mut self, addr: u64, len: usize) -> Result<usize>;

    /// Read `len` bytes from `addr` into the transfer buffer, returning
    /// the read length the backend reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    fn read(&mut self, addr: u64, len: usize) -> Result<usize>;

    /// Total capacity the backend reports, in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    fn size(&mut self) -> Result<u64>;

    /// The shared transfer buffer, sized for at least one block.
    fn transfer_buf(&mut self) -> &mut [u8];
}
