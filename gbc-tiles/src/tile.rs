//! Single 8x8 tile

use crate::{MAX_PIXEL, TILE_BYTES, TILE_BYTES_1BPP, TILE_PIXELS, TILE_SIZE, TileError};

/// 64 pixel indices, row-major, each in `0..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pixels: [u8; TILE_PIXELS],
}

impl Default for Tile {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Tile {
    /// All pixels index 0
    pub const BLANK: Tile = Tile {
        pixels: [0; TILE_PIXELS],
    };

    /// Build a tile from pixel indices, rejecting values above 3
    pub fn from_pixels(pixels: [u8; TILE_PIXELS]) -> Result<Self, TileError> {
        if let Some((index, &value)) = pixels.iter().enumerate().find(|&(_, &p)| p > MAX_PIXEL) {
            return Err(TileError::InvalidPixel { index, value });
        }
        Ok(Self { pixels })
    }

    /// Decode one 2BPP tile
    pub fn from_2bpp(bytes: &[u8; TILE_BYTES]) -> Self {
        let mut pixels = [0u8; TILE_PIXELS];
        for (row, planes) in bytes.chunks_exact(2).enumerate() {
            let (lo, hi) = (planes[0], planes[1]);
            for x in 0..TILE_SIZE {
                let bit = 7 - x;
                pixels[row * TILE_SIZE + x] = ((lo >> bit) & 1) | (((hi >> bit) & 1) << 1);
            }
        }
        Self { pixels }
    }

    /// Encode as 2BPP
    pub fn to_2bpp(&self) -> [u8; TILE_BYTES] {
        let mut bytes = [0u8; TILE_BYTES];
        for (row, pixels) in self.pixels.chunks_exact(TILE_SIZE).enumerate() {
            for (x, &pixel) in pixels.iter().enumerate() {
                let bit = 7 - x;
                bytes[row * 2] |= (pixel & 1) << bit;
                bytes[row * 2 + 1] |= ((pixel >> 1) & 1) << bit;
            }
        }
        bytes
    }

    /// Decode one tile from separate bitplanes (one byte per row each)
    pub fn from_planes(lo: &[u8; TILE_SIZE], hi: &[u8; TILE_SIZE]) -> Self {
        let mut bytes = [0u8; TILE_BYTES];
        for row in 0..TILE_SIZE {
            bytes[row * 2] = lo[row];
            bytes[row * 2 + 1] = hi[row];
        }
        Self::from_2bpp(&bytes)
    }

    /// Split into `(low, high)` bitplanes
    pub fn to_planes(&self) -> ([u8; TILE_SIZE], [u8; TILE_SIZE]) {
        let bytes = self.to_2bpp();
        (
            std::array::from_fn(|row| bytes[row * 2]),
            std::array::from_fn(|row| bytes[row * 2 + 1]),
        )
    }

    /// Same tile with every row reversed
    pub fn mirrored(&self) -> Self {
        let mut pixels = self.pixels;
        for row in pixels.chunks_exact_mut(TILE_SIZE) {
            row.reverse();
        }
        Self { pixels }
    }

    /// Decode one 1BPP tile (set bits become index 3)
    pub fn from_1bpp(bytes: &[u8; TILE_BYTES_1BPP]) -> Self {
        let mut pixels = [0u8; TILE_PIXELS];
        for (row, &byte) in bytes.iter().enumerate() {
            for x in 0..TILE_SIZE {
                pixels[row * TILE_SIZE + x] = ((byte >> (7 - x)) & 1) * MAX_PIXEL;
            }
        }
        Self { pixels }
    }

    /// Encode as 1BPP; only indices 0 and 3 are representable
    pub fn to_1bpp(&self) -> Result<[u8; TILE_BYTES_1BPP], TileError> {
        let mut bytes = [0u8; TILE_BYTES_1BPP];
        for (index, &pixel) in self.pixels.iter().enumerate() {
            match pixel {
                0 => {}
                MAX_PIXEL => bytes[index / TILE_SIZE] |= 1 << (7 - index % TILE_SIZE),
                value => return Err(TileError::InvalidPixel { index, value }),
            }
        }
        Ok(bytes)
    }

    /// Pixel at column `x`, row `y`
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * TILE_SIZE + x]
    }

    pub fn pixels(&self) -> &[u8; TILE_PIXELS] {
        &self.pixels
    }

    /// Rows of 8 pixels, top first
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(TILE_SIZE)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_tile() {
        let tile = Tile::from_2bpp(&[0u8; TILE_BYTES]);
        assert_eq!(tile.pixels(), &[0u8; TILE_PIXELS]);
        assert!(tile.is_blank());
    }

    #[test]
    fn test_plane_bits_combine() {
        // Row 0: lo 0b1010_0000, hi 0b1100_0000 -> 3, 2, 1, 0, ...
        let mut bytes = [0u8; TILE_BYTES];
        bytes[0] = 0b1010_0000;
        bytes[1] = 0b1100_0000;
        let tile = Tile::from_2bpp(&bytes);

        assert_eq!(&tile.pixels()[..4], &[3, 2, 1, 0]);
        assert!(tile.pixels()[4..].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_msb_is_leftmost() {
        let mut bytes = [0u8; TILE_BYTES];
        bytes[14] = 0x01; // row 7, lo plane, rightmost bit
        let tile = Tile::from_2bpp(&bytes);

        assert_eq!(tile.pixel(7, 7), 1);
        assert_eq!(tile.pixel(0, 7), 0);
    }

    #[test]
    fn test_2bpp_roundtrip() {
        let bytes: [u8; TILE_BYTES] = [
            0x7C, 0x7C, 0x00, 0xC6, 0xC6, 0x00, 0x00, 0xFE, 0xC6, 0xC6, 0x00, 0xC6, 0xC6, 0x00,
            0x00, 0x00,
        ];
        let tile = Tile::from_2bpp(&bytes);
        assert!(tile.pixels().iter().all(|&p| p <= MAX_PIXEL));
        assert_eq!(tile.to_2bpp(), bytes);
    }

    #[test]
    fn test_from_pixels_validates() {
        let mut pixels = [2u8; TILE_PIXELS];
        assert!(Tile::from_pixels(pixels).is_ok());

        pixels[10] = 4;
        assert_eq!(
            Tile::from_pixels(pixels),
            Err(TileError::InvalidPixel {
                index: 10,
                value: 4
            })
        );
    }

    #[test]
    fn test_1bpp_maps_to_index_3() {
        let mut bytes = [0u8; TILE_BYTES_1BPP];
        bytes[0] = 0x80;
        let tile = Tile::from_1bpp(&bytes);

        assert_eq!(tile.pixel(0, 0), 3);
        assert_eq!(tile.pixel(1, 0), 0);
        assert_eq!(tile.to_1bpp(), Ok(bytes));
    }

    #[test]
    fn test_1bpp_rejects_mid_shades() {
        let mut pixels = [0u8; TILE_PIXELS];
        pixels[9] = 1;
        let tile = Tile::from_pixels(pixels).unwrap();

        assert_eq!(
            tile.to_1bpp(),
            Err(TileError::InvalidPixel { index: 9, value: 1 })
        );
    }

    #[test]
    fn test_planes_match_interleaved() {
        let mut bytes = [0u8; TILE_BYTES];
        bytes[0] = 0b1010_0000;
        bytes[1] = 0b1100_0000;
        bytes[15] = 0x01;
        let tile = Tile::from_2bpp(&bytes);

        let (lo, hi) = tile.to_planes();
        assert_eq!(lo[0], 0b1010_0000);
        assert_eq!(hi[0], 0b1100_0000);
        assert_eq!(hi[7], 0x01);
        assert_eq!(Tile::from_planes(&lo, &hi), tile);
    }

    #[test]
    fn test_mirrored() {
        let mut bytes = [0u8; TILE_BYTES];
        bytes[0] = 0x80; // row 0, leftmost pixel = 1
        let tile = Tile::from_2bpp(&bytes);
        let mirrored = tile.mirrored();

        assert_eq!(mirrored.pixel(7, 0), 1);
        assert_eq!(mirrored.pixel(0, 0), 0);
        assert_eq!(mirrored.to_2bpp()[0], 0x01);
        assert_eq!(mirrored.mirrored(), tile);
    }

    #[test]
    fn test_rows() {
        let tile = Tile::from_pixels(std::array::from_fn(|i| (i / TILE_SIZE % 4) as u8)).unwrap();
        let rows: Vec<&[u8]> = tile.rows().collect();

        assert_eq!(rows.len(), 8);
        assert_eq!(rows[5], &[1u8; 8]);
    }
}
