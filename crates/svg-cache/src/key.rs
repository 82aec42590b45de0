//! Handle keys
//!
//! The full (source, dimensions, fit, color) tuple a handle is looked up by,
//! and the hash that seeds its handle id.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use svg_render::{Color, PixelSize};

/// How the document is mapped onto the requested pixel dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FitPolicy {
    /// Scale the native canvas independently per axis to fill the target
    #[default]
    Stretch,
    /// Scale and translate the tight content bounding box onto the target
    ContentFit,
}

/// Exact identity of a cached render configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey {
    pub source: String,
    pub dimensions: PixelSize,
    pub fit: FitPolicy,
    pub color: Color,
}

impl HandleKey {
    pub fn new(source: impl Into<String>, dimensions: PixelSize, fit: FitPolicy, color: Color) -> Self {
        Self {
            source: source.into(),
            dimensions,
            fit,
            color,
        }
    }

    /// See [`hash_key`]
    pub fn hash_value(&self) -> u64 {
        hash_key(&self.source, self.dimensions, self.fit, self.color)
    }
}

/// Combine a render configuration into one lookup key.
///
/// Every field goes in at full width (all four color channels included).
/// Deterministic for the lifetime of the process.
pub fn hash_key(source: &str, dimensions: PixelSize, fit: FitPolicy, color: Color) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.write_u32(dimensions.width);
    hasher.write_u32(dimensions.height);
    hasher.write_u8(fit as u8);
    hasher.write_u32(color.to_u32());
    hasher.finish()
}
