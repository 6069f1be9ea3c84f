//! Pipeline errors
//!
//! Failures of the core crates surface through their own error types; these
//! cover what only makes sense once a catalog is involved.

/// Catalog and reinsertion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("graphics entry has an empty id")]
    EmptyId,

    #[error("graphics id '{0}' must not contain path separators or '..'")]
    InvalidId(String),

    #[error("duplicate graphics id '{0}'")]
    DuplicateId(String),

    #[error("raw graphics '{0}' needs a tile count")]
    MissingTileCount(String),

    #[error("'{id}' has {actual} tiles, catalog says {expected}")]
    TileCountMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{0}' has no tiles")]
    EmptyTileSet(String),

    #[error("recompressed '{id}' needs {required} bytes but the original block occupies {available}")]
    RegionOverflow {
        id: String,
        required: usize,
        available: usize,
    },

    #[error("'{first}' and '{second}' occupy overlapping ROM regions")]
    OverlappingRegions { first: String, second: String },
}
