//! Flash geometry constants and size parsing.

use crate::{Error, Result};

/// Immutable geometry of the device under test.
///
/// Validated once at construction; the engine trusts these values
/// everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    /// Declared total capacity in bytes.
    pub flash_size: u64,
    /// Smallest erasable unit in bytes.
    pub block_size: usize,
    /// Smallest programmable unit in bytes.
    pub page_size: usize,
}

impl FlashGeometry {
    /// Create a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGeometry`] unless `flash_size` is a
    /// power-of-two multiple of `block_size` and `block_size` is a
    /// nonzero multiple of `page_size`.
    pub fn new(flash_size: u64, block_size: usize, page_size: usize) -> Result<Self> {
        if page_size == 0 || block_size == 0 || flash_size == 0 {
            return Err(Error::InvalidGeometry(
                "sizes must be nonzero".to_string(),
            ));
        }
        if block_size % page_size != 0 {
            return Err(Error::InvalidGeometry(format!(
                "block size {block_size} is not a multiple of page size {page_size}"
            )));
        }
        if flash_size % block_size as u64 != 0
            || !(flash_size / block_size as u64).is_power_of_two()
        {
            return Err(Error::InvalidGeometry(format!(
                "flash size {flash_size} is not a power-of-two multiple of block size {block_size}"
            )));
        }
        Ok(Self {
            flash_size,
            block_size,
            page_size,
        })
    }

    /// Number of erasable blocks.
    #[must_use]
    pub fn block_count(&self) -> u64 {
        self.flash_size / self.block_size as u64
    }

    /// Number of programmable pages per block.
    #[must_use]
    pub fn pages_per_block(&self) -> usize {
        self.block_size / self.page_size
    }
}

/// Parse size string (e.g., "8M", "4K", "4096") to bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidGeometry`] if the string is not a number with
/// an optional K/M/G/T suffix.
pub fn parse_size(size: &str) -> Result<u64> {
    let size = size.trim().to_uppercase();

    let (num_str, multiplier) = if size.ends_with('K') {
        (&size[..size.len() - 1], 1024u64)
    } else if size.ends_with('M') {
        (&size[..size.len() - 1], 1024u64 * 1024)
    } else if size.ends_with('G') {
        (&size[..size.len() - 1], 1024u64 * 1024 * 1024)
    } else if size.ends_with('T') {
        (&size[..size.len() - 1], 1024u64 * 1024 * 1024 * 1024)
    } else {
        (size.as_str(), 1u64)
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| Error::InvalidGeometry(format!("invalid size number: {num_str}")))?;
    Ok(num * multiplier)
}

/// Format bytes as human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else if bytes > 0 {
        format!("{bytes}B")
    } else {
        "0".to_string()
    }
}
