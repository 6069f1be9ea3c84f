//! graphics.toml catalog parsing
//!
//! The catalog lists verified graphics locations. Finding those locations is
//! done elsewhere (symbol files, manual inspection); this module only loads
//! and checks the list. A catalog is an ordinary value handed to each call,
//! so unrelated extractions never share state.
//!
//! ```toml
//! [[graphics]]
//! id = "title_tiles"
//! location = "02:601A"
//! tiles = 128
//!
//! [[graphics]]
//! id = "font"
//! location = "00:2800"
//! compressed = false
//! tiles = 64
//! format = "1bpp"
//! ```
//!
//! `format` is one of `2bpp` (default), `1bpp`, `2bpp-reversed` or
//! `2bpp-planar`.

use anyhow::{Context, Result};
use gbc_rom::BankAddress;
use gbc_tiles::TileFormat;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::ExportError;

/// Top-level catalog
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub graphics: Vec<GraphicsEntry>,
}

/// One block of tile graphics
#[derive(Debug, Clone, Deserialize)]
pub struct GraphicsEntry {
    /// Unique name, also the PNG file stem
    pub id: String,

    /// `BB:AAAA` location of the LZ77 block, or of the first raw tile
    pub location: String,

    /// Stored as an LZ77 block (default) or as raw tiles
    #[serde(default = "default_compressed")]
    pub compressed: bool,

    /// Tile count. Required for raw graphics; for compressed blocks it is
    /// checked against the decompressed size.
    #[serde(default)]
    pub tiles: Option<usize>,

    /// Sheet width in tiles when exported
    #[serde(default = "default_tiles_per_row")]
    pub tiles_per_row: usize,

    #[serde(default)]
    pub format: CatalogFormat,
}

/// Raw tile encoding as written in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CatalogFormat {
    #[default]
    #[serde(rename = "2bpp")]
    TwoBpp,
    #[serde(rename = "1bpp")]
    OneBpp,
    #[serde(rename = "2bpp-reversed")]
    TwoBppReversed,
    #[serde(rename = "2bpp-planar")]
    TwoBppPlanar,
}

impl From<CatalogFormat> for TileFormat {
    fn from(format: CatalogFormat) -> Self {
        match format {
            CatalogFormat::TwoBpp => TileFormat::TwoBpp,
            CatalogFormat::OneBpp => TileFormat::OneBpp,
            CatalogFormat::TwoBppReversed => TileFormat::TwoBppReversed,
            CatalogFormat::TwoBppPlanar => TileFormat::TwoBppPlanar,
        }
    }
}

fn default_compressed() -> bool {
    true
}

fn default_tiles_per_row() -> usize {
    16
}

impl GraphicsEntry {
    /// Compressed 2BPP entry with default layout
    pub fn new(id: impl Into<String>, location: BankAddress) -> Self {
        Self {
            id: id.into(),
            location: location.to_string(),
            compressed: default_compressed(),
            tiles: None,
            tiles_per_row: default_tiles_per_row(),
            format: CatalogFormat::default(),
        }
    }

    pub fn bank_address(&self) -> Result<BankAddress> {
        self.location
            .parse()
            .with_context(|| format!("Invalid location for '{}'", self.id))
    }

    pub fn tile_format(&self) -> TileFormat {
        self.format.into()
    }

    /// Sheet file name for this entry
    pub fn file_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

impl Catalog {
    /// Load catalog from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid catalog: {}", path.display()))
    }

    /// Parse and validate catalog from string
    pub fn parse(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content).context("Failed to parse graphics catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check ids, locations and tile counts without touching a ROM
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for entry in &self.graphics {
            if entry.id.trim().is_empty() {
                return Err(ExportError::EmptyId.into());
            }
            if entry.id.contains(['/', '\\']) || entry.id.contains("..") {
                return Err(ExportError::InvalidId(entry.id.clone()).into());
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ExportError::DuplicateId(entry.id.clone()).into());
            }
            entry.bank_address()?;
            if !entry.compressed && entry.tiles.is_none() {
                return Err(ExportError::MissingTileCount(entry.id.clone()).into());
            }
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&GraphicsEntry> {
        self.graphics.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }
}
