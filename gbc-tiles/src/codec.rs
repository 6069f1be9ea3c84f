//! Raw tile streams

use crate::{TILE_BYTES, TILE_BYTES_1BPP, TILE_SIZE, Tile, TileError};

/// Ordered tiles, as stored in the stream
pub type TileSet = Vec<Tile>;

/// Raw tile encodings found in cartridges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileFormat {
    /// 2 bits per pixel, interleaved bitplanes
    #[default]
    TwoBpp,
    /// 1 bit per pixel
    OneBpp,
    /// 2BPP with bit 0 as the leftmost pixel
    TwoBppReversed,
    /// 2BPP with every low plane first, then every high plane
    TwoBppPlanar,
}

impl TileFormat {
    pub const fn bytes_per_tile(self) -> usize {
        match self {
            TileFormat::TwoBpp | TileFormat::TwoBppReversed | TileFormat::TwoBppPlanar => TILE_BYTES,
            TileFormat::OneBpp => TILE_BYTES_1BPP,
        }
    }

    /// Decode a raw stream in this format
    pub fn decode(self, raw: &[u8]) -> Result<TileSet, TileError> {
        match self {
            TileFormat::TwoBpp => decode(raw),
            TileFormat::OneBpp => decode_1bpp(raw),
            TileFormat::TwoBppReversed => decode_reversed(raw),
            TileFormat::TwoBppPlanar => decode_planar(raw),
        }
    }

    /// Encode tiles in this format
    pub fn encode(self, tiles: &[Tile]) -> Result<Vec<u8>, TileError> {
        match self {
            TileFormat::TwoBpp => Ok(encode(tiles)),
            TileFormat::OneBpp => encode_1bpp(tiles),
            TileFormat::TwoBppReversed => Ok(encode_reversed(tiles)),
            TileFormat::TwoBppPlanar => Ok(encode_planar(tiles)),
        }
    }
}

fn check_aligned(raw: &[u8], tile_bytes: usize) -> Result<(), TileError> {
    if raw.len() % tile_bytes != 0 {
        return Err(TileError::MisalignedLength {
            len: raw.len(),
            tile_bytes,
        });
    }
    Ok(())
}

/// Decode a 2BPP stream into tiles
///
/// # Errors
/// `MisalignedLength` if the stream is not a whole number of 16-byte tiles
pub fn decode(raw: &[u8]) -> Result<TileSet, TileError> {
    check_aligned(raw, TILE_BYTES)?;

    Ok(raw
        .chunks_exact(TILE_BYTES)
        .map(|chunk| {
            let mut bytes = [0u8; TILE_BYTES];
            bytes.copy_from_slice(chunk);
            Tile::from_2bpp(&bytes)
        })
        .collect())
}

/// Encode tiles as a 2BPP stream (16 bytes per tile)
pub fn encode(tiles: &[Tile]) -> Vec<u8> {
    tiles.iter().flat_map(|tile| tile.to_2bpp()).collect()
}

/// Decode a 2BPP stream whose rows store the leftmost pixel in bit 0
pub fn decode_reversed(raw: &[u8]) -> Result<TileSet, TileError> {
    Ok(decode(raw)?.iter().map(Tile::mirrored).collect())
}

/// Encode tiles as 2BPP with the leftmost pixel in bit 0
pub fn encode_reversed(tiles: &[Tile]) -> Vec<u8> {
    tiles.iter().flat_map(|tile| tile.mirrored().to_2bpp()).collect()
}

/// Decode a planar 2BPP stream
///
/// The first half holds the low plane of every tile (8 bytes each), the
/// second half the high planes in the same order.
///
/// # Errors
/// `MisalignedLength` if the stream is not a whole number of 16-byte tiles
pub fn decode_planar(raw: &[u8]) -> Result<TileSet, TileError> {
    check_aligned(raw, TILE_BYTES)?;
    let (lo, hi) = raw.split_at(raw.len() / 2);

    Ok(lo
        .chunks_exact(TILE_SIZE)
        .zip(hi.chunks_exact(TILE_SIZE))
        .map(|(lo, hi)| {
            let mut lo_rows = [0u8; TILE_SIZE];
            let mut hi_rows = [0u8; TILE_SIZE];
            lo_rows.copy_from_slice(lo);
            hi_rows.copy_from_slice(hi);
            Tile::from_planes(&lo_rows, &hi_rows)
        })
        .collect())
}

/// Encode tiles as a planar 2BPP stream
pub fn encode_planar(tiles: &[Tile]) -> Vec<u8> {
    let mut lo = Vec::with_capacity(tiles.len() * TILE_BYTES);
    let mut hi = Vec::with_capacity(tiles.len() * TILE_SIZE);
    for tile in tiles {
        let (lo_rows, hi_rows) = tile.to_planes();
        lo.extend_from_slice(&lo_rows);
        hi.extend_from_slice(&hi_rows);
    }
    lo.extend_from_slice(&hi);
    lo
}

/// Decode a 1BPP stream into tiles
pub fn decode_1bpp(raw: &[u8]) -> Result<TileSet, TileError> {
    check_aligned(raw, TILE_BYTES_1BPP)?;

    Ok(raw
        .chunks_exact(TILE_BYTES_1BPP)
        .map(|chunk| {
            let mut bytes = [0u8; TILE_BYTES_1BPP];
            bytes.copy_from_slice(chunk);
            Tile::from_1bpp(&bytes)
        })
        .collect())
}

/// Encode tiles as a 1BPP stream
///
/// # Errors
/// `InvalidPixel` for any index other than 0 or 3
pub fn encode_1bpp(tiles: &[Tile]) -> Result<Vec<u8>, TileError> {
    let mut raw = Vec::with_capacity(tiles.len() * TILE_BYTES_1BPP);
    for tile in tiles {
        raw.extend_from_slice(&tile.to_1bpp()?);
    }
    Ok(raw)
}
