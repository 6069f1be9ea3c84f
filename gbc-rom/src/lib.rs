//! Game Boy Color cartridge images
//!
//! Geometry, header and addressing for flat ROM dumps:
//!
//! - [`RomImage`] owns the cartridge bytes and enforces bank alignment
//! - [`RomHeader`] parses the header at `0x100..0x150`
//! - [`BankAddress`] turns the `BB:AAAA` locations found in symbol files into
//!   absolute offsets
//!
//! # Address Map
//!
//! ```text
//! 0x0000-0x3FFF  fixed window       always bank 0
//! 0x4000-0x7FFF  switchable window  bank N -> N * 0x4000 + (addr - 0x4000)
//! ```
//!
//! No file I/O happens here; callers load and save the bytes.

mod bank;
mod header;
mod rom;

pub use bank::{BankAddress, resolve};
pub use header::{RomHeader, global_checksum, header_checksum};
pub use rom::RomImage;

/// Bytes per ROM bank
pub const BANK_SIZE: usize = 0x4000;

/// First CPU address of the switchable bank window
pub const SWITCHABLE_WINDOW_START: u16 = 0x4000;

/// One past the last CPU address mapped to cartridge ROM
pub const ROM_WINDOW_END: u32 = 0x8000;

/// Errors raised by cartridge geometry and header checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RomError {
    /// Bank or address lies outside the cartridge
    #[error("{bank:02X}:{address:04X} is outside the cartridge ({bank_count} banks)")]
    OutOfRange {
        bank: u16,
        address: u16,
        bank_count: usize,
    },

    /// Image length is not a whole number of banks
    #[error("ROM size {0:#X} is not a non-zero multiple of the 16 KiB bank size")]
    MisalignedRomSize(usize),

    /// Image length disagrees with the header's ROM size code
    #[error("ROM is {actual:#X} bytes but its header declares {declared:#X}")]
    HeaderSizeMismatch { declared: usize, actual: usize },

    /// Image too short to contain a header
    #[error("ROM is too short to contain a cartridge header ({0:#X} bytes)")]
    HeaderTooShort(usize),

    /// ROM size code outside the defined range
    #[error("unknown ROM size code {0:#04X}")]
    UnknownRomSizeCode(u8),

    /// Unparseable `BB:AAAA` location
    #[error("invalid bank address '{0}' (expected BB:AAAA in hex)")]
    InvalidBankAddress(String),

    /// Read or write reaching past the end of the image
    #[error("region of {len} bytes at {offset:#X} runs past the end of the ROM")]
    RegionOutOfBounds { offset: usize, len: usize },
}
