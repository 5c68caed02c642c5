//! In-memory NOR flash simulation.
//!
//! Models the properties the qualification engine depends on: power-of-two
//! capacity with address wrap-around, erase-to-0xFF, and program as an
//! AND-write (NOR can only clear bits). Blocks can be poisoned with a
//! stuck-at-zero bit and transport failures can be injected, so every
//! engine failure path is reachable from tests.

use std::collections::HashSet;

use tracing::trace;

use crate::device::BlockDevice;
use crate::{Error, Result};

/// Bit forced low in poisoned blocks, on erase and program alike.
const STUCK_MASK: u8 = 0xFE;

/// Simulated NOR flash backed by a byte vector.
#[derive(Debug)]
pub struct MemFlash {
    media: Vec<u8>,
    buf: Vec<u8>,
    block_size: usize,
    poisoned: HashSet<u64>,
    fail_erase: bool,
    fail_write: bool,
    fail_read: bool,
}

impl MemFlash {
    /// Create a simulated device of `capacity` bytes, erased to 0xFF.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] unless `capacity` is a
    /// power-of-two multiple of `block_size`.
    pub fn new(capacity: u64, block_size: usize) -> Result<Self> {
        if block_size == 0
            || capacity % block_size as u64 != 0
            || !(capacity / block_size as u64).is_power_of_two()
        {
            return Err(Error::InvalidGeometry(format!(
                "capacity {capacity} is not a power-of-two multiple of block size {block_size}"
            )));
        }
        Ok(Self {
            media: vec![0xFF; capacity as usize],
            buf: vec![0; block_size],
            block_size,
            poisoned: HashSet::new(),
            fail_erase: false,
            fail_write: false,
            fail_read: false,
        })
    }

    /// Mark the block containing `addr` as having a stuck-at-zero bit.
    pub fn poison_block(&mut self, addr: u64) {
        let block = self.wrap(addr) as u64 / self.block_size as u64;
        self.poisoned.insert(block);
    }

    /// Make every subsequent erase fail at the transport level.
    pub fn fail_erases(&mut self, enabled: bool) {
        self.fail_erase = enabled;
    }

    /// Make every subsequent write fail at the transport level.
    pub fn fail_writes(&mut self, enabled: bool) {
        self.fail_write = enabled;
    }

    /// Make every subsequent read fail at the transport level.
    pub fn fail_reads(&mut self, enabled: bool) {
        self.fail_read = enabled;
    }

    /// Raw media contents, for test assertions.
    #[must_use]
    pub fn media(&self) -> &[u8] {
        &self.media
    }

    fn wrap(&self, addr: u64) -> usize {
        // Capacity is a power of two, so modulo is a mask.
        (addr & (self.media.len() as u64 - 1)) as usize
    }

    fn is_poisoned(&self, index: usize) -> bool {
        self.poisoned
            .contains(&(index as u64 / self.block_size as u64))
    }
}

impl BlockDevice for MemFlash {
    fn erase(&mut self, addr: u64, len: usize) -> Result<usize> {
        if self.fail_erase {
            return Err(Error::Transport {
                op: "erase",
                detail: "injected erase failure".to_string(),
            });
        }
        if addr % self.block_size as u64 != 0 || len % self.block_size != 0 {
            return Err(Error::Transport {
                op: "erase",
                detail: format!("unaligned erase, addr=0x{addr:x} len={len}"),
            });
        }
        let start = self.wrap(addr);
        if len > self.media.len() - start {
            return Err(Error::Transport {
                op: "erase",
                detail: format!("erase of {len} bytes at 0x{addr:x} runs past the media"),
            });
        }
        trace!(addr, start, len, "erase");
        for i in start..start + len {
            self.media[i] = if self.is_poisoned(i) {
                0xFF & STUCK_MASK
            } else {
                0xFF
            };
        }
        Ok(len)
    }

    fn write(&mut self, addr: u64, len: usize) -> Result<usize> {
        if self.fail_write {
            return Err(Error::Transport {
                op: "write",
                detail: "injected write failure".to_string(),
            });
        }
        if len == 0 || len > self.buf.len() || addr % len as u64 != 0 {
            return Err(Error::Transport {
                op: "write",
                detail: format!("invalid write, addr=0x{addr:x} len={len}"),
            });
        }
        let start = self.wrap(addr);
        if len > self.media.len() - start {
            return Err(Error::Transport {
                op: "write",
                detail: format!("write of {len} bytes at 0x{addr:x} runs past the media"),
            });
        }
        trace!(addr, start, len, "write");
        for k in 0..len {
            let mut value = self.media[start + k] & self.buf[k];
            if self.is_poisoned(start + k) {
                value &= STUCK_MASK;
            }
            self.media[start + k] = value;
        }
        Ok(len)
    }

    fn read(&mut self, addr: u64, len: usize) -> Result<usize> {
        if self.fail_read {
            return Err(Error::Transport {
                op: "read",
                detail: "injected read failure".to_string(),
            });
        }
        if len > self.buf.len() {
            return Err(Error::Transport {
                op: "read",
                detail: format!("read of {len} bytes exceeds transfer buffer"),
            });
        }
        let start = self.wrap(addr);
        let end = (start + len).min(self.media.len());
        self.buf[..end - start].copy_from_slice(&self.media[start..end]);
        Ok(end - start)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.media.len() as u64)
    }

    fn transfer_buf(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}
