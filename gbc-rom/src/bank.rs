//! Bank-relative addressing
//!
//! Disassembly labels name data as `bank:address`, where the address is what
//! the CPU sees with that bank mapped in. Resolution turns that back into an
//! offset into the flat dump.

use std::fmt;
use std::str::FromStr;

use crate::{BANK_SIZE, ROM_WINDOW_END, RomError, SWITCHABLE_WINDOW_START};

/// A `(bank, address)` location as written in symbol files (`02:601A`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BankAddress {
    pub bank: u16,
    pub address: u16,
}

impl BankAddress {
    pub const fn new(bank: u16, address: u16) -> Self {
        Self { bank, address }
    }

    /// Location of an absolute offset, in the form a symbol file would use
    ///
    /// Bank 0 keeps its flat address; other banks are expressed in the
    /// switchable window. Returns `None` past the 16-bit bank range.
    pub fn from_offset(offset: usize) -> Option<Self> {
        let bank = u16::try_from(offset / BANK_SIZE).ok()?;
        let address = if bank == 0 {
            offset as u16
        } else {
            SWITCHABLE_WINDOW_START + (offset % BANK_SIZE) as u16
        };
        Some(Self { bank, address })
    }

    /// Absolute offset in a cartridge of `bank_count` banks
    pub fn resolve(self, bank_count: usize) -> Result<usize, RomError> {
        resolve(bank_count, self.bank, self.address)
    }
}

/// Resolve `bank:address` to an absolute offset
///
/// - Fixed window (`0x0000..0x4000`): always bank 0, whatever bank was asked
///   for, mirroring the hardware
/// - Switchable window (`0x4000..0x8000`): `bank * 0x4000 + (address - 0x4000)`;
///   bank 0 here is read as a flat offset (ROM0 labels in 32 KiB images)
///
/// # Errors
/// `OutOfRange` if the bank does not exist, the address is outside the ROM
/// windows, or the offset lands past the end of the cartridge.
pub fn resolve(bank_count: usize, bank: u16, address: u16) -> Result<usize, RomError> {
    let out_of_range = || RomError::OutOfRange {
        bank,
        address,
        bank_count,
    };

    if bank as usize >= bank_count || address as u32 >= ROM_WINDOW_END {
        return Err(out_of_range());
    }

    let offset = if address < SWITCHABLE_WINDOW_START || bank == 0 {
        address as usize
    } else {
        bank as usize * BANK_SIZE + (address - SWITCHABLE_WINDOW_START) as usize
    };

    if offset >= bank_count * BANK_SIZE {
        return Err(out_of_range());
    }

    Ok(offset)
}

impl fmt::Display for BankAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:04X}", self.bank, self.address)
    }
}

impl FromStr for BankAddress {
    type Err = RomError;

    /// Parse `BB:AAAA` (hex, `$` or `0x` prefixes on either part allowed)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RomError::InvalidBankAddress(s.to_string());

        let (bank, address) = s.trim().split_once(':').ok_or_else(invalid)?;
        let bank = parse_hex_u16(bank).ok_or_else(invalid)?;
        let address = parse_hex_u16(address).ok_or_else(invalid)?;

        Ok(Self { bank, address })
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let s = s.trim();
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}
