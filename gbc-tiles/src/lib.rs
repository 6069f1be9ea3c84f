//! Game Boy tile graphics
//!
//! Converts raw tile bytes to 8x8 grids of 2-bit pixel indices and back,
//! and lays tiles out as sheets for image export.
//!
//! # 2BPP Layout
//!
//! ```text
//! 16 bytes per tile, 2 bytes per row (top row first):
//!   byte 2r     bitplane 0 (low bit of each pixel)
//!   byte 2r+1   bitplane 1 (high bit of each pixel)
//! bit 7 = leftmost pixel
//! ```
//!
//! Two less common 2BPP variants use the same 16 bytes per tile. Reversed
//! tiles keep the interleaving but put the leftmost pixel in bit 0. Planar
//! streams store every tile's low plane first and then every high plane.
//!
//! # 1BPP Layout
//!
//! 8 bytes per tile, one per row. Set bits become index 3 so 1BPP art shows
//! up black-on-white next to 2BPP sheets.
//!
//! Pixel values are palette indices only; shading is left to the caller.

mod codec;
mod sheet;
mod tile;

pub use codec::{
    TileFormat, TileSet, decode, decode_1bpp, decode_planar, decode_reversed, encode, encode_1bpp,
    encode_planar, encode_reversed,
};
pub use sheet::PixelGrid;
pub use tile::Tile;

/// Tile width and height in pixels
pub const TILE_SIZE: usize = 8;

/// Pixels per tile
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Bytes per 2BPP tile
pub const TILE_BYTES: usize = 16;

/// Bytes per 1BPP tile
pub const TILE_BYTES_1BPP: usize = 8;

/// Largest 2-bit pixel index
pub const MAX_PIXEL: u8 = 3;

/// Errors raised while converting tiles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    /// Raw stream length is not a whole number of tiles
    #[error("{len} bytes is not a multiple of the {tile_bytes}-byte tile size")]
    MisalignedLength { len: usize, tile_bytes: usize },

    /// Pixel value outside what the format can store
    #[error("pixel {index} has value {value}, outside the format's range")]
    InvalidPixel { index: usize, value: u8 },

    /// Sheet dimensions are not whole tiles
    #[error("{width}x{height} is not a whole number of 8x8 tiles")]
    MisalignedDimensions { width: usize, height: usize },

    /// Pixel buffer does not match the stated dimensions
    #[error("expected {expected} pixels, got {actual}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Sheet holds fewer tiles than requested
    #[error("sheet holds {capacity} tiles, {requested} requested")]
    SheetTooSmall { capacity: usize, requested: usize },
}
