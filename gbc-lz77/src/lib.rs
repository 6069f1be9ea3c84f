//! gbc-lz77: LZ77 codec for compressed Game Boy Color graphics
//!
//! Graphics in the cartridge are stored as self-describing blocks: a marker
//! byte, the decompressed size, then a stream of control bytes and tokens.
//! This crate reads blocks straight out of a ROM buffer at any offset and
//! writes new blocks for reinsertion.
//!
//! **This is a pure codec** - it never resolves banks or interprets the
//! decompressed bytes. The caller (gbc-rom / gbc-tiles) handles both.
//!
//! # Block Format
//!
//! ```text
//! 0x00: marker (0x10)
//! 0x01: decompressed size (u24 LE)
//! 0x04: token stream
//!
//! Token stream (repeats until the declared size is produced):
//!   control byte, bits consumed MSB first, one per token
//!   bit = 0 -> literal:   1 byte, copied to output
//!   bit = 1 -> reference: 2 bytes, LLLL DDDD DDDDDDDD
//!              length   = L + 3   (3..=18)
//!              distance = D + 1   (1..=4096)
//! ```
//!
//! A reference copies `length` bytes, one at a time, starting `distance`
//! bytes back from the end of the output. The source may overlap the bytes
//! being written, which is how runs are encoded.
//!
//! # Usage
//!
//! ```
//! use gbc_lz77::{compress, decompress};
//!
//! let raw = b"ABABABABABABABAB".to_vec();
//! let block = compress(&raw).unwrap();
//! assert_eq!(decompress(&block, 0).unwrap(), raw);
//! ```

mod decode;
mod encode;

pub use decode::{BlockHeader, DecompressedBlock, decompress, decompress_block, peek_header};
pub use encode::compress;

// =============================================================================
// Constants
// =============================================================================

/// Marker byte identifying an LZ77 block
pub const LZ77_MARKER: u8 = 0x10;

/// Marker + 24-bit decompressed size
pub const HEADER_SIZE: usize = 4;

/// Shortest back-reference (encoded as length nibble 0)
pub const MIN_MATCH: usize = 3;

/// Longest back-reference (encoded as length nibble 15)
pub const MAX_MATCH: usize = MIN_MATCH + 0x0F;

/// Back-reference window (12-bit distance field, biased by one)
pub const WINDOW_SIZE: usize = 0x1000;

/// Largest size the 24-bit header field can declare
pub const MAX_DECOMPRESSED_SIZE: usize = 0xFF_FFFF;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur while decoding or encoding a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Lz77Error {
    /// Block does not start with [`LZ77_MARKER`]
    #[error("expected LZ77 marker 0x10 at offset {offset:#X}, found {found:#04X}")]
    BadMarker { offset: usize, found: u8 },

    /// Input ran out before the declared size was produced
    #[error("input ended at offset {position:#X} after producing {produced} bytes")]
    Truncated { position: usize, produced: usize },

    /// Back-reference points before the start of the output
    #[error("back-reference distance {distance} exceeds the {available} bytes produced so far")]
    InvalidBackReference { distance: usize, available: usize },

    /// Raw data is too large for the 24-bit size field
    #[error("{0} bytes does not fit the 24-bit size field")]
    InputTooLarge(usize),
}

// =============================================================================
// Tests
// =============================================================================
