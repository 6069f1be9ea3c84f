//! Graphics extraction (ROM -> tiles)

use anyhow::{Context, Result};
use gbc_rom::{BankAddress, RomError, RomImage};
use gbc_tiles::{PixelGrid, TileSet};
use rayon::prelude::*;

use crate::catalog::{Catalog, GraphicsEntry};
use crate::error::ExportError;

/// Tiles pulled out of the ROM for one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGraphics {
    pub id: String,
    pub location: BankAddress,

    /// Absolute offset of the block (or of the first raw tile)
    pub offset: usize,

    /// Bytes the graphics occupy in the ROM, block header included
    pub footprint: usize,

    pub tiles: TileSet,
    pub tiles_per_row: usize,
}

impl ExtractedGraphics {
    /// Tiles laid out as an exportable sheet
    pub fn sheet(&self) -> PixelGrid {
        PixelGrid::from_tiles(&self.tiles, self.tiles_per_row)
    }

    /// One past the last byte of the footprint
    pub fn end(&self) -> usize {
        self.offset + self.footprint
    }
}

/// Extract one entry
///
/// Compressed entries are decompressed in place; raw entries read exactly
/// `tiles` tiles. Any failure aborts the entry with no partial tiles.
pub fn extract_entry(rom: &RomImage, entry: &GraphicsEntry) -> Result<ExtractedGraphics> {
    let location = entry.bank_address()?;
    let offset = rom
        .resolve(location)
        .with_context(|| format!("Failed to resolve '{}'", entry.id))?;
    let format = entry.tile_format();

    let (raw, footprint) = if entry.compressed {
        let block = gbc_lz77::decompress_block(rom.as_bytes(), offset)
            .with_context(|| format!("Failed to decompress '{}' at {}", entry.id, location))?;
        (block.data, block.compressed_len)
    } else {
        let count = entry
            .tiles
            .ok_or_else(|| ExportError::MissingTileCount(entry.id.clone()))?;
        let len = count
            .checked_mul(format.bytes_per_tile())
            .ok_or(RomError::RegionOutOfBounds {
                offset,
                len: usize::MAX,
            })
            .with_context(|| format!("Tile count for '{}' is too large", entry.id))?;
        let raw = rom
            .region(offset, len)
            .with_context(|| format!("Failed to read raw tiles for '{}'", entry.id))?;
        (raw.to_vec(), len)
    };

    let tiles = format
        .decode(&raw)
        .with_context(|| format!("'{}' does not hold whole tiles", entry.id))?;

    if let Some(expected) = entry.tiles {
        if tiles.len() != expected {
            return Err(ExportError::TileCountMismatch {
                id: entry.id.clone(),
                expected,
                actual: tiles.len(),
            }
            .into());
        }
    }

    tracing::debug!(
        id = %entry.id,
        %location,
        offset,
        footprint,
        tiles = tiles.len(),
        "extracted graphics"
    );

    Ok(ExtractedGraphics {
        id: entry.id.clone(),
        location,
        offset,
        footprint,
        tiles,
        tiles_per_row: entry.tiles_per_row,
    })
}

/// Extract every catalog entry in parallel
///
/// The ROM is only read, so entries are independent. Results come back in
/// catalog order; one failing entry does not stop the others.
pub fn extract_all(rom: &RomImage, catalog: &Catalog) -> Vec<(String, Result<ExtractedGraphics>)> {
    catalog
        .graphics
        .par_iter()
        .map(|entry| (entry.id.clone(), extract_entry(rom, entry)))
        .collect()
}
