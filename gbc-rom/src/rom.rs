//! Owned cartridge image

use crate::header::{self, RomHeader};
use crate::{BANK_SIZE, BankAddress, RomError};

/// Full cartridge contents
///
/// Borrowed immutably while graphics are extracted (it is `Sync`, so
/// independent blocks can be read from several threads), and mutably while
/// new data is patched in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    data: Vec<u8>,
}

impl RomImage {
    /// Wrap a cartridge dump, checking it against its own header
    ///
    /// # Errors
    /// - `MisalignedRomSize` if the length is not a whole number of banks
    /// - `HeaderTooShort` / `UnknownRomSizeCode` for an unusable header
    /// - `HeaderSizeMismatch` if the length differs from the declared size
    pub fn new(data: Vec<u8>) -> Result<Self, RomError> {
        let rom = Self::from_banks(data)?;
        let declared = rom.header()?.declared_rom_size()?;
        if declared != rom.len() {
            return Err(RomError::HeaderSizeMismatch {
                declared,
                actual: rom.len(),
            });
        }
        Ok(rom)
    }

    /// Wrap bank-aligned data without consulting the header
    ///
    /// For headerless test images and dumps with a wrong size code.
    pub fn from_banks(data: Vec<u8>) -> Result<Self, RomError> {
        if data.is_empty() || data.len() % BANK_SIZE != 0 {
            return Err(RomError::MisalignedRomSize(data.len()));
        }
        Ok(Self { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bank_count(&self) -> usize {
        self.data.len() / BANK_SIZE
    }

    pub fn header(&self) -> Result<RomHeader, RomError> {
        RomHeader::parse(&self.data)
    }

    /// Bytes of one bank, if it exists
    pub fn bank(&self, bank: u16) -> Option<&[u8]> {
        let start = bank as usize * BANK_SIZE;
        self.data.get(start..start + BANK_SIZE)
    }

    /// Absolute offset of a bank-relative location
    pub fn resolve(&self, location: BankAddress) -> Result<usize, RomError> {
        location.resolve(self.bank_count())
    }

    /// `len` bytes starting at `offset`
    pub fn region(&self, offset: usize, len: usize) -> Result<&[u8], RomError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(RomError::RegionOutOfBounds { offset, len })
    }

    /// Overwrite bytes in place
    ///
    /// The image is left untouched when the region does not fit.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> Result<(), RomError> {
        let target = offset
            .checked_add(bytes.len())
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or(RomError::RegionOutOfBounds {
                offset,
                len: bytes.len(),
            })?;
        target.copy_from_slice(bytes);
        Ok(())
    }

    pub fn header_checksum_valid(&self) -> bool {
        self.header()
            .map(|h| h.header_checksum == header::header_checksum(&self.data))
            .unwrap_or(false)
    }

    pub fn global_checksum_valid(&self) -> bool {
        self.header()
            .map(|h| h.global_checksum == header::global_checksum(&self.data))
            .unwrap_or(false)
    }

    /// Recompute both header checksums after patching
    ///
    /// The header checksum goes first since the global sum covers it.
    pub fn fix_checksums(&mut self) {
        header::write_header_checksum(&mut self.data);
        header::write_global_checksum(&mut self.data);
    }

    /// Recompute only the global checksum, leaving the header byte as found
    pub fn fix_global_checksum(&mut self) {
        header::write_global_checksum(&mut self.data);
    }
}

impl AsRef<[u8]> for RomImage {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
