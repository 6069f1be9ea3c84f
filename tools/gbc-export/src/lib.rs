//! gbc-export library
//!
//! Extraction and reinsertion pipeline on top of the core crates:
//! catalog entry -> bank resolution -> LZ77 -> tiles -> PNG sheet, and back.

pub mod catalog;
pub mod error;
pub mod extract;
pub mod insert;
pub mod png;

pub use catalog::{Catalog, CatalogFormat, GraphicsEntry};
pub use error::ExportError;
pub use extract::{ExtractedGraphics, extract_all, extract_entry};
pub use insert::{InsertReport, insert_all, insert_entry};
pub use png::{read_png, sheet_tiles, write_png};
