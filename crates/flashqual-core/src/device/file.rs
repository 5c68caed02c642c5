//! File-backed flash image device.
//!
//! Lets the CLI qualify a dumped flash image. Unlike real NOR, a file has
//! no address wrap-around; accesses past the end of the image fail, which
//! the capacity probe treats the same way as a wrapped sentinel.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::device::BlockDevice;
use crate::{Error, Result};

/// Flash image backed by a file on disk.
#[derive(Debug)]
pub struct FileFlash {
    file: File,
    capacity: u64,
    buf: Vec<u8>,
}

impl FileFlash {
    /// Open an existing image read-write.
    ///
    /// The image length is taken as the device capacity. The transfer
    /// buffer is sized to one block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or stat'd.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::Io(format!("failed to open {}: {e}", path.display())))?;
        let capacity = file
            .metadata()
            .map_err(|e| Error::Io(format!("failed to stat {}: {e}", path.display())))?
            .len();
        Ok(Self {
            file,
            capacity,
            buf: vec![0; block_size],
        })
    }

    /// Create a fresh erased image of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or filled.
    pub fn create<P: AsRef<Path>>(path: P, capacity: u64, block_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::Io(format!("failed to create {}: {e}", path.display())))?;
        let chunk = vec![0xFFu8; block_size];
        let mut remaining = capacity;
        while remaining > 0 {
            let n = chunk.len().min(remaining as usize);
            file.write_all(&chunk[..n])
                .map_err(|e| Error::Io(format!("failed to fill {}: {e}", path.display())))?;
            remaining -= n as u64;
        }
        Ok(Self {
            file,
            capacity,
            buf: vec![0; block_size],
        })
    }

    fn check_range(&self, op: &'static str, addr: u64, len: usize) -> Result<()> {
        if addr
            .checked_add(len as u64)
            .map_or(true, |end| end > self.capacity)
        {
            return Err(Error::Transport {
                op,
                detail: format!(
                    "access at 0x{addr:x}+{len} past image end 0x{:x}",
                    self.capacity
                ),
            });
        }
        Ok(())
    }

    fn seek(&mut self, addr: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(addr))
            .map_err(|e| Error::Io(format!("seek to 0x{addr:x} failed: {e}")))?;
        Ok(())
    }
}

impl BlockDevice for FileFlash {
    fn erase(&mut self, addr: u64, len: usize) -> Result<usize> {
        self.check_range("erase", addr, len)?;
        self.seek(addr)?;
        let chunk = vec![0xFFu8; self.buf.len().min(len)];
        let mut remaining = len;
        while remaining > 0 {
            let n = chunk.len().min(remaining);
            self.file
                .write_all(&chunk[..n])
                .map_err(|e| Error::Io(format!("erase at 0x{addr:x} failed: {e}")))?;
            remaining -= n;
        }
        Ok(len)
    }

    fn write(&mut self, addr: u64, len: usize) -> Result<usize> {
        self.check_range("write", addr, len)?;
        self.seek(addr)?;
        self.file
            .write_all(&self.buf[..len])
            .map_err(|e| Error::Io(format!("write at 0x{addr:x} failed: {e}")))?;
        Ok(len)
    }

    fn read(&mut self, addr: u64, len: usize) -> Result<usize> {
        self.check_range("read", addr, len)?;
        self.seek(addr)?;
        self.file
            .read_exact(&mut self.buf[..len])
            .map_err(|e| Error::Io(format!("read at 0x{addr:x} failed: {e}")))?;
        Ok(len)
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.capacity)
    }

    fn transfer_buf(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");

        let mut dev = FileFlash::create(&path, 8192, 4096).unwrap();
        assert_eq!(dev.size().unwrap(), 8192);
        dev.read(0, 4096).unwrap();
        assert!(dev.transfer_buf()[..4096].iter().all(|&b| b == 0xFF));

        dev.transfer_buf()[..4].copy_from_slice(b"qual");
        dev.write(4096, 4).unwrap();
        drop(dev);

        let mut dev = FileFlash::open(&path, 4096).unwrap();
        dev.read(4096, 4).unwrap();
        assert_eq!(&dev.transfer_buf()[..4], b"qual");
    }

    #[test]
    fn test_erase_fills_ff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        let mut dev = FileFlash::create(&path, 8192, 4096).unwrap();

        dev.transfer_buf()[..4096].fill(0x00);
        dev.write(0, 4096).unwrap();
        dev.erase(0, 4096).unwrap();
        dev.read(0, 4096).unwrap();
        assert!(dev.transfer_buf()[..4096].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_access_past_end_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.img");
        let mut dev = FileFlash::create(&path, 8192, 4096).unwrap();

        assert!(dev.read(8192, 1).is_err());
        assert!(dev.erase(8192, 4096).is_err());
        assert!(dev.write(4096 + 8192, 16).is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.img");
        assert!(FileFlash::open(&path, 4096).is_err());
    }
}
