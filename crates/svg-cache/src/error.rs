//! Cache errors

use std::error::Error as StdError;

/// Why a document could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Empty SVG source")]
    EmptySource,
    #[error("Could not load SVG file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not load SVG data from file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Why a size variant could not be rasterized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("Invalid raster size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Raster size {width}x{height} exceeds maximum texture size {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}
