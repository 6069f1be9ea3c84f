//! Graphics reinsertion (tiles -> ROM)
//!
//! Edited tiles are re-encoded, recompressed when the entry is compressed and
//! written back over the original block. The new data must fit in the bytes
//! the original occupied; anything after the new stream is left as it was.

use anyhow::{Context, Result};
use gbc_rom::{BankAddress, RomImage};
use gbc_tiles::{Tile, TileSet};

use crate::catalog::{Catalog, GraphicsEntry};
use crate::error::ExportError;
use crate::extract::{ExtractedGraphics, extract_entry};

/// What was written for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReport {
    pub id: String,
    pub location: BankAddress,
    pub offset: usize,
    /// Bytes written
    pub written: usize,
    /// Bytes available at the location
    pub footprint: usize,
}

impl InsertReport {
    /// Footprint bytes left holding stale data
    pub fn slack(&self) -> usize {
        self.footprint - self.written
    }
}

/// Encode (and compress) tiles the way `entry` stores them
fn encode_entry(entry: &GraphicsEntry, tiles: &[Tile]) -> Result<Vec<u8>> {
    let raw = entry
        .tile_format()
        .encode(tiles)
        .with_context(|| format!("Failed to encode tiles for '{}'", entry.id))?;

    if entry.compressed {
        gbc_lz77::compress(&raw).with_context(|| format!("Failed to compress '{}'", entry.id))
    } else {
        Ok(raw)
    }
}

/// Write `tiles` over an already located entry
fn write_tiles(
    rom: &mut RomImage,
    entry: &GraphicsEntry,
    current: &ExtractedGraphics,
    tiles: &[Tile],
) -> Result<InsertReport> {
    if tiles.is_empty() {
        return Err(ExportError::EmptyTileSet(entry.id.clone()).into());
    }

    // Raw graphics have no length field, so the count must not change
    let expected = entry
        .tiles
        .or((!entry.compressed).then_some(current.tiles.len()));
    if let Some(expected) = expected {
        if tiles.len() != expected {
            return Err(ExportError::TileCountMismatch {
                id: entry.id.clone(),
                expected,
                actual: tiles.len(),
            }
            .into());
        }
    }

    let bytes = encode_entry(entry, tiles)?;
    if bytes.len() > current.footprint {
        return Err(ExportError::RegionOverflow {
            id: entry.id.clone(),
            required: bytes.len(),
            available: current.footprint,
        }
        .into());
    }

    rom.patch(current.offset, &bytes)
        .with_context(|| format!("Failed to write '{}'", entry.id))?;

    tracing::debug!(
        id = %entry.id,
        location = %current.location,
        written = bytes.len(),
        footprint = current.footprint,
        "inserted graphics"
    );

    Ok(InsertReport {
        id: entry.id.clone(),
        location: current.location,
        offset: current.offset,
        written: bytes.len(),
        footprint: current.footprint,
    })
}

/// Replace one entry's graphics and fix the global checksum
///
/// The footprint is taken from what is currently stored at the entry's
/// location. On error the ROM is unchanged.
pub fn insert_entry(rom: &mut RomImage, entry: &GraphicsEntry, tiles: &[Tile]) -> Result<InsertReport> {
    let current = extract_entry(rom, entry)?;
    let report = write_tiles(rom, entry, &current, tiles)?;
    rom.fix_global_checksum();
    Ok(report)
}

/// Fail if any two located entries share ROM bytes
fn check_overlaps(located: &[ExtractedGraphics]) -> Result<(), ExportError> {
    let mut spans: Vec<&ExtractedGraphics> = located.iter().collect();
    spans.sort_by_key(|g| g.offset);

    for pair in spans.windows(2) {
        if pair[1].offset < pair[0].end() {
            return Err(ExportError::OverlappingRegions {
                first: pair[0].id.clone(),
                second: pair[1].id.clone(),
            });
        }
    }
    Ok(())
}

/// Reinsert every catalog entry that has replacement tiles
///
/// `replacement` is asked for each entry in catalog order, given the graphics
/// currently stored there, and returns `None` to leave the entry alone.
/// Every entry is located and checked for overlaps first, then all writes
/// happen on a copy; `rom` is only replaced once everything succeeded.
pub fn insert_all<F>(rom: &mut RomImage, catalog: &Catalog, mut replacement: F) -> Result<Vec<InsertReport>>
where
    F: FnMut(&GraphicsEntry, &ExtractedGraphics) -> Result<Option<TileSet>>,
{
    let located = catalog
        .graphics
        .iter()
        .map(|entry| extract_entry(rom, entry))
        .collect::<Result<Vec<_>>>()?;
    check_overlaps(&located)?;

    let mut staged = rom.clone();
    let mut reports = Vec::new();

    for (entry, current) in catalog.graphics.iter().zip(&located) {
        let Some(tiles) = replacement(entry, current)? else {
            tracing::debug!(id = %entry.id, "no replacement, skipping");
            continue;
        };
        reports.push(write_tiles(&mut staged, entry, current, &tiles)?);
    }

    staged.fix_global_checksum();
    *rom = staged;

    tracing::info!(entries = reports.len(), "reinsertion complete");
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbc_rom::BANK_SIZE;

    /// Tiles of flat rows; compresses well
    fn tiles(count: usize, seed: u8) -> Vec<Tile> {
        (0..count)
            .map(|i| {
                Tile::from_pixels(std::array::from_fn(|p| {
                    ((p / 8 + i + seed as usize) % 4) as u8
                }))
                .unwrap()
            })
            .collect()
    }

    /// Pseudo-random tiles; barely compress at all
    fn noise(count: usize, seed: u32) -> Vec<Tile> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                Tile::from_pixels(std::array::from_fn(|_| {
                    state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                    (state >> 30) as u8
                }))
                .unwrap()
            })
            .collect()
    }

    /// Four banks, size code 0x01; noisy block "a" at 01:4000, flat block "b" at 02:4000
    fn rom_with_blocks() -> RomImage {
        let mut data = vec![0u8; 4 * BANK_SIZE];
        data[0x148] = 0x01;
        for (bank, block_tiles) in [(1usize, noise(8, 7)), (2, tiles(8, 0))] {
            let block = gbc_lz77::compress(&gbc_tiles::encode(&block_tiles)).unwrap();
            let start = bank * BANK_SIZE;
            data[start..start + block.len()].copy_from_slice(&block);
        }
        RomImage::new(data).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog {
            graphics: vec![
                GraphicsEntry::new("a", BankAddress::new(1, 0x4000)),
                GraphicsEntry::new("b", BankAddress::new(2, 0x4000)),
            ],
        }
    }

    #[test]
    fn test_insert_entry_roundtrip() {
        let mut rom = rom_with_blocks();
        let entry = GraphicsEntry::new("a", BankAddress::new(1, 0x4000));
        let replacement = tiles(8, 2);

        let report = insert_entry(&mut rom, &entry, &replacement).unwrap();
        assert_eq!(report.offset, BANK_SIZE);
        assert!(report.written < report.footprint);
        assert_eq!(report.slack(), report.footprint - report.written);

        assert_eq!(extract_entry(&rom, &entry).unwrap().tiles, replacement);
        assert!(rom.global_checksum_valid());
    }

    #[test]
    fn test_stale_tail_left_in_place() {
        let mut rom = rom_with_blocks();
        let entry = GraphicsEntry::new("a", BankAddress::new(1, 0x4000));
        let before = rom.clone();

        let report = insert_entry(&mut rom, &entry, &tiles(8, 1)).unwrap();
        let tail = report.offset + report.written..report.offset + report.footprint;
        assert_eq!(&rom.as_bytes()[tail.clone()], &before.as_bytes()[tail]);
    }

    #[test]
    fn test_overflow_leaves_rom_unchanged() {
        let mut rom = rom_with_blocks();
        let before = rom.clone();
        let entry = GraphicsEntry::new("b", BankAddress::new(2, 0x4000));

        let err = insert_entry(&mut rom, &entry, &noise(8, 99)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::RegionOverflow { id, .. }) if id == "b"
        ));
        assert_eq!(rom, before);
    }

    #[test]
    fn test_empty_tiles_rejected() {
        let mut rom = rom_with_blocks();
        let entry = GraphicsEntry::new("a", BankAddress::new(1, 0x4000));

        let err = insert_entry(&mut rom, &entry, &[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ExportError>(),
            Some(&ExportError::EmptyTileSet("a".to_string()))
        );
    }

    #[test]
    fn test_raw_entry_keeps_tile_count() {
        let mut data = vec![0u8; 2 * BANK_SIZE];
        data[0x4000..0x4040].copy_from_slice(&gbc_tiles::encode(&tiles(4, 0)));
        let mut rom = RomImage::from_banks(data).unwrap();

        let mut entry = GraphicsEntry::new("raw", BankAddress::new(1, 0x4000));
        entry.compressed = false;
        entry.tiles = Some(4);

        assert!(insert_entry(&mut rom, &entry, &tiles(3, 1)).is_err());

        let report = insert_entry(&mut rom, &entry, &tiles(4, 1)).unwrap();
        assert_eq!(report.written, 64);
        assert_eq!(report.slack(), 0);
        assert_eq!(extract_entry(&rom, &entry).unwrap().tiles, tiles(4, 1));
    }

    #[test]
    fn test_insert_all_skips_none() {
        let mut rom = rom_with_blocks();
        let catalog = catalog();
        let b_before = extract_entry(&rom, &catalog.graphics[1]).unwrap();

        let reports = insert_all(&mut rom, &catalog, |entry, _| {
            Ok((entry.id == "a").then(|| tiles(8, 3)))
        })
        .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, "a");
        assert_eq!(
            extract_entry(&rom, &catalog.graphics[0]).unwrap().tiles,
            tiles(8, 3)
        );
        assert_eq!(extract_entry(&rom, &catalog.graphics[1]).unwrap(), b_before);
        assert!(rom.global_checksum_valid());
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let mut rom = rom_with_blocks();
        let before = rom.clone();

        let result = insert_all(&mut rom, &catalog(), |entry, _| {
            if entry.id == "a" {
                Ok(Some(tiles(8, 3)))
            } else {
                Ok(Some(Vec::new()))
            }
        });

        assert!(result.is_err());
        assert_eq!(rom, before);
    }

    #[test]
    fn test_overlapping_entries_rejected() {
        let mut rom = rom_with_blocks();
        let mut catalog = catalog();

        // Raw view over the start of block "a"
        let mut raw = GraphicsEntry::new("overlay", BankAddress::new(1, 0x4000));
        raw.compressed = false;
        raw.tiles = Some(1);
        catalog.graphics.push(raw);

        let err = insert_all(&mut rom, &catalog, |_, _| Ok(None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::OverlappingRegions { .. })
        ));
    }
}
