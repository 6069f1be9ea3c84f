//! Cartridge header (`0x100..0x150`)

use crate::RomError;

const TITLE_START: usize = 0x134;
const TITLE_END: usize = 0x144;
const CGB_FLAG: usize = 0x143;
const CARTRIDGE_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const HEADER_CHECKSUM: usize = 0x14D;
const GLOBAL_CHECKSUM: usize = 0x14E;

/// One past the last header byte
pub(crate) const HEADER_END: usize = 0x150;

/// Parsed cartridge header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    /// Title, NUL padding removed
    pub title: String,
    pub cgb_flag: u8,
    pub cartridge_type: u8,
    pub rom_size_code: u8,
    pub ram_size_code: u8,
    pub header_checksum: u8,
    /// Stored big-endian at `0x14E`
    pub global_checksum: u16,
}

impl RomHeader {
    /// Parse the header from the start of a ROM image
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < HEADER_END {
            return Err(RomError::HeaderTooShort(data.len()));
        }

        Ok(Self {
            title: String::from_utf8_lossy(&data[TITLE_START..TITLE_END])
                .trim_end_matches('\0')
                .to_string(),
            cgb_flag: data[CGB_FLAG],
            cartridge_type: data[CARTRIDGE_TYPE],
            rom_size_code: data[ROM_SIZE],
            ram_size_code: data[RAM_SIZE],
            header_checksum: data[HEADER_CHECKSUM],
            global_checksum: u16::from_be_bytes([data[GLOBAL_CHECKSUM], data[GLOBAL_CHECKSUM + 1]]),
        })
    }

    /// ROM size in bytes declared by the size code (`32 KiB << code`)
    pub fn declared_rom_size(&self) -> Result<usize, RomError> {
        match self.rom_size_code {
            code @ 0x00..=0x08 => Ok(0x8000 << code),
            code => Err(RomError::UnknownRomSizeCode(code)),
        }
    }

    /// Cartridge supports Game Boy Color features
    pub fn is_cgb(&self) -> bool {
        self.cgb_flag & 0x80 != 0
    }

    /// Cartridge refuses to run on a DMG
    pub fn is_cgb_only(&self) -> bool {
        self.cgb_flag == 0xC0
    }

    /// Memory bank controller family for the cartridge type byte
    pub fn mapper_name(&self) -> &'static str {
        match self.cartridge_type {
            0x00 | 0x08 | 0x09 => "ROM ONLY",
            0x01..=0x03 => "MBC1",
            0x05 | 0x06 => "MBC2",
            0x0B..=0x0D => "MMM01",
            0x0F..=0x13 => "MBC3",
            0x19..=0x1E => "MBC5",
            0x20 => "MBC6",
            0x22 => "MBC7",
            0xFC => "POCKET CAMERA",
            0xFD => "BANDAI TAMA5",
            0xFE => "HuC3",
            0xFF => "HuC1",
            _ => "UNKNOWN",
        }
    }
}

/// Header checksum over `0x134..=0x14C`, as verified by the boot ROM
///
/// `data` must contain at least the full header.
pub fn header_checksum(data: &[u8]) -> u8 {
    data[TITLE_START..HEADER_CHECKSUM]
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_sub(b).wrapping_sub(1))
}

/// Global checksum: 16-bit sum of every byte except the checksum itself
pub fn global_checksum(data: &[u8]) -> u16 {
    data.iter()
        .enumerate()
        .filter(|&(i, _)| i != GLOBAL_CHECKSUM && i != GLOBAL_CHECKSUM + 1)
        .fold(0u16, |sum, (_, &b)| sum.wrapping_add(b as u16))
}

pub(crate) fn write_header_checksum(data: &mut [u8]) {
    data[HEADER_CHECKSUM] = header_checksum(data);
}

pub(crate) fn write_global_checksum(data: &mut [u8]) {
    let sum = global_checksum(data);
    data[GLOBAL_CHECKSUM..GLOBAL_CHECKSUM + 2].copy_from_slice(&sum.to_be_bytes());
}
