//! Tile sheets
//!
//! A sheet is the 2-D pixel grid that gets written to (and read back from)
//! an image file: tiles in stream order, left to right, top to bottom.

use crate::{MAX_PIXEL, TILE_PIXELS, TILE_SIZE, Tile, TileError, TileSet};

/// Row-major grid of pixel indices, both dimensions multiples of 8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

fn check_dimensions(width: usize, height: usize) -> Result<(), TileError> {
    if width % TILE_SIZE != 0 || height % TILE_SIZE != 0 {
        return Err(TileError::MisalignedDimensions { width, height });
    }
    Ok(())
}

impl PixelGrid {
    /// Blank (index 0) grid
    pub fn new(width: usize, height: usize) -> Result<Self, TileError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; width * height],
        })
    }

    /// Wrap existing pixel indices
    ///
    /// # Errors
    /// - `MisalignedDimensions` if either dimension is not a multiple of 8
    /// - `PixelCountMismatch` if `pixels.len() != width * height`
    /// - `InvalidPixel` for values above 3
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, TileError> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(TileError::PixelCountMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        if let Some((index, &value)) = pixels.iter().enumerate().find(|&(_, &p)| p > MAX_PIXEL) {
            return Err(TileError::InvalidPixel { index, value });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Lay tiles out `tiles_per_row` across; unused cells stay index 0
    pub fn from_tiles(tiles: &[Tile], tiles_per_row: usize) -> Self {
        let columns = tiles_per_row.max(1);
        let rows = tiles.len().div_ceil(columns);
        let width = columns * TILE_SIZE;
        let height = rows * TILE_SIZE;
        let mut pixels = vec![0u8; width * height];

        for (i, tile) in tiles.iter().enumerate() {
            let origin_x = (i % columns) * TILE_SIZE;
            let origin_y = (i / columns) * TILE_SIZE;
            for (y, row) in tile.rows().enumerate() {
                let start = (origin_y + y) * width + origin_x;
                pixels[start..start + TILE_SIZE].copy_from_slice(row);
            }
        }

        Self {
            width,
            height,
            pixels,
        }
    }

    /// Cut the first `count` tiles back out of the sheet
    ///
    /// # Errors
    /// `SheetTooSmall` if the sheet has fewer than `count` cells
    pub fn to_tiles(&self, count: usize) -> Result<TileSet, TileError> {
        let capacity = self.tile_capacity();
        if count > capacity {
            return Err(TileError::SheetTooSmall {
                capacity,
                requested: count,
            });
        }

        let columns = self.columns();
        let tiles = (0..count)
            .map(|i| {
                let origin_x = (i % columns) * TILE_SIZE;
                let origin_y = (i / columns) * TILE_SIZE;
                let mut pixels = [0u8; TILE_PIXELS];
                for (y, row) in pixels.chunks_exact_mut(TILE_SIZE).enumerate() {
                    let start = (origin_y + y) * self.width + origin_x;
                    row.copy_from_slice(&self.pixels[start..start + TILE_SIZE]);
                }
                Tile::from_pixels(pixels)
            })
            .collect::<Result<TileSet, _>>()?;

        Ok(tiles)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Tiles per sheet row
    pub fn columns(&self) -> usize {
        self.width / TILE_SIZE
    }

    /// Number of 8x8 cells in the sheet
    pub fn tile_capacity(&self) -> usize {
        self.columns() * (self.height / TILE_SIZE)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}
