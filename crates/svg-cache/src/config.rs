//! Cache Configuration

use std::path::PathBuf;

/// Cache configuration options
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Largest texture edge, in pixels, a size variant may rasterize to
    pub max_texture_size: u32,

    /// Base directory for relative sources and nested SVG resources
    pub resources_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_texture_size: 8192,
            resources_dir: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn with_max_texture_size(mut self, max: u32) -> Self {
        self.max_texture_size = max;
        self
    }

    #[must_use]
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }
}
