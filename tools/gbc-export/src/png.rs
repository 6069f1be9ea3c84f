//! PNG sheet conversion
//!
//! Pixel index 0 is white and 3 is black. Imported images are converted to
//! greyscale and each pixel snaps to the nearest of the four shades, so
//! sheets edited in any paint program come back as valid indices.
//! Transparency is composited over white, so erased pixels read as index 0.

use anyhow::{Context, Result, bail};
use gbc_tiles::{PixelGrid, TileSet};
use image::{GrayAlphaImage, GrayImage, ImageFormat, Luma, LumaA};
use std::path::Path;

use crate::catalog::GraphicsEntry;
use crate::extract::ExtractedGraphics;

/// Grey level for each pixel index
pub const SHADES: [u8; 4] = [255, 170, 85, 0];

/// Pixel index whose shade is closest to `luma`
pub fn nearest_index(luma: u8) -> u8 {
    SHADES
        .iter()
        .enumerate()
        .min_by_key(|&(_, &shade)| shade.abs_diff(luma))
        .map(|(index, _)| index as u8)
        .unwrap_or(0)
}

pub fn grid_to_image(grid: &PixelGrid) -> GrayImage {
    let width = grid.width();
    GrayImage::from_fn(width as u32, grid.height() as u32, |x, y| {
        let index = grid.pixels()[y as usize * width + x as usize];
        Luma([SHADES[index as usize]])
    })
}

pub fn image_to_grid(image: &GrayImage) -> Result<PixelGrid> {
    let pixels = image.pixels().map(|Luma([luma])| nearest_index(*luma)).collect();
    PixelGrid::from_pixels(image.width() as usize, image.height() as usize, pixels)
        .context("Image is not a valid tile sheet")
}

/// Composite a grey+alpha image over a white background
pub fn flatten_alpha(image: &GrayAlphaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let LumaA([luma, alpha]) = *image.get_pixel(x, y);
        let (luma, alpha) = (u32::from(luma), u32::from(alpha));
        Luma([((luma * alpha + 255 * (255 - alpha) + 127) / 255) as u8])
    })
}

/// Save a sheet as a greyscale PNG
pub fn write_png(path: &Path, grid: &PixelGrid) -> Result<()> {
    if grid.width() == 0 || grid.height() == 0 {
        bail!("Refusing to write an empty sheet: {}", path.display());
    }
    grid_to_image(grid)
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))
}

/// Load any image the `image` crate understands as a sheet
pub fn read_png(path: &Path) -> Result<PixelGrid> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load image: {}", path.display()))?
        .to_luma_alpha8();
    image_to_grid(&flatten_alpha(&image)).with_context(|| format!("Invalid sheet: {}", path.display()))
}

/// Replacement tiles for `entry` from `<dir>/<id>.png`, if that file exists
///
/// Raw entries take exactly their catalog tile count from the sheet;
/// compressed ones take as many tiles as the block currently holds, unless
/// the catalog pins a count.
pub fn sheet_tiles(dir: &Path, entry: &GraphicsEntry, current: &ExtractedGraphics) -> Result<Option<TileSet>> {
    let path = dir.join(entry.file_name());
    if !path.exists() {
        return Ok(None);
    }

    let count = entry.tiles.unwrap_or(current.tiles.len());
    let grid = read_png(&path)?;
    let tiles = grid
        .to_tiles(count)
        .with_context(|| format!("Sheet for '{}' is too small: {}", entry.id, path.display()))?;

    tracing::debug!(id = %entry.id, path = %path.display(), tiles = tiles.len(), "read sheet");
    Ok(Some(tiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbc_rom::BankAddress;
    use gbc_tiles::Tile;

    fn gradient_tiles(count: usize) -> Vec<Tile> {
        (0..count)
            .map(|i| Tile::from_pixels(std::array::from_fn(|p| ((p % 8 + i) % 4) as u8)).unwrap())
            .collect()
    }

    #[test]
    fn test_nearest_index() {
        assert_eq!(nearest_index(255), 0);
        assert_eq!(nearest_index(220), 0);
        assert_eq!(nearest_index(180), 1);
        assert_eq!(nearest_index(100), 2);
        assert_eq!(nearest_index(20), 3);
        assert_eq!(nearest_index(0), 3);
    }

    #[test]
    fn test_shades_map_back() {
        for (index, &shade) in SHADES.iter().enumerate() {
            assert_eq!(nearest_index(shade) as usize, index);
        }
    }

    #[test]
    fn test_image_roundtrip() {
        let grid = PixelGrid::from_tiles(&gradient_tiles(5), 4);
        let image = grid_to_image(&grid);

        assert_eq!(image.dimensions(), (32, 16));
        assert_eq!(image.get_pixel(0, 0), &Luma([255]));
        assert_eq!(image_to_grid(&image).unwrap(), grid);
    }

    #[test]
    fn test_misaligned_image_rejected() {
        let image = GrayImage::new(10, 8);
        assert!(image_to_grid(&image).is_err());
    }

    #[test]
    fn test_png_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        let grid = PixelGrid::from_tiles(&gradient_tiles(3), 16);

        write_png(&path, &grid).unwrap();
        assert_eq!(read_png(&path).unwrap(), grid);
    }

    #[test]
    fn test_flatten_alpha() {
        let mut image = GrayAlphaImage::from_pixel(8, 8, LumaA([0, 0]));
        image.put_pixel(1, 0, LumaA([0, 255]));
        image.put_pixel(2, 0, LumaA([0, 128]));
        let flat = flatten_alpha(&image);

        assert_eq!(flat.get_pixel(0, 0), &Luma([255]));
        assert_eq!(flat.get_pixel(1, 0), &Luma([0]));
        assert_eq!(flat.get_pixel(2, 0), &Luma([127]));
    }

    #[test]
    fn test_transparent_pixels_read_as_white() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("erased.png");

        // Fully transparent black everywhere except one opaque black pixel
        let mut image = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]));
        image.put_pixel(3, 2, image::Rgba([0, 0, 0, 255]));
        image.save_with_format(&path, ImageFormat::Png).unwrap();

        let grid = read_png(&path).unwrap();
        let tile = grid.to_tiles(1).unwrap()[0];
        assert_eq!(tile.pixel(3, 2), 3);
        assert_eq!(tile.pixels().iter().filter(|&&p| p == 0).count(), 63);
    }

    #[test]
    fn test_sheet_tiles() {
        let dir = tempfile::tempdir().unwrap();
        let tiles = gradient_tiles(6);
        let entry = GraphicsEntry::new("sprites", BankAddress::new(1, 0x4000));
        let current = ExtractedGraphics {
            id: "sprites".to_string(),
            location: BankAddress::new(1, 0x4000),
            offset: 0x4000,
            footprint: 40,
            tiles: tiles.clone(),
            tiles_per_row: 16,
        };

        // No file yet: nothing to insert
        assert_eq!(sheet_tiles(dir.path(), &entry, &current).unwrap(), None);

        write_png(&dir.path().join("sprites.png"), &current.sheet()).unwrap();
        assert_eq!(sheet_tiles(dir.path(), &entry, &current).unwrap(), Some(tiles));
    }
}
