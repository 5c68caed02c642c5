//! Reference byte patterns used by the verification routines.

/// A single-byte pattern repeated to fill a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePattern {
    /// State of NOR flash after erase (0xFF).
    Erased,
    /// Sentinel written to block 0 to detect address wrap-around (0x5A).
    MarkerBlockZero,
    /// Fill pattern programmed into blocks under test (0xA5).
    Fill,
}

impl ReferencePattern {
    /// The repeated byte value.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Erased => 0xFF,
            Self::MarkerBlockZero => 0x5A,
            Self::Fill => 0xA5,
        }
    }

    /// Build a buffer of `len` bytes filled with this pattern.
    #[must_use]
    pub fn buffer(self, len: usize) -> Vec<u8> {
        vec![self.byte(); len]
    }
}

/// Block-sized reference buffers, built once per run and read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct PatternBuffers {
    /// Expected content of an erased block.
    pub erased: Vec<u8>,
    /// Block 0 sentinel content.
    pub marker: Vec<u8>,
    /// Expected content of a programmed block.
    pub fill: Vec<u8>,
}

impl PatternBuffers {
    /// Build all three reference buffers for one block size.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            erased: ReferencePattern::Erased.buffer(block_size),
            marker: ReferencePattern::MarkerBlockZero.buffer(block_size),
            fill: ReferencePattern::Fill.buffer(block_size),
        }
    }
}
