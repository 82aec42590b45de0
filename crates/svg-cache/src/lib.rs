//! fOS SVG Cache
//!
//! Shared, reference-counted render data for SVG images.
//!
//! Three tiers sit behind every handle:
//! - **Document**: one parsed SVG per source
//! - **Size variant**: one lazily rasterized texture per (pixel size, fit policy)
//! - **Color variant**: one tinted quad per color, bound to its size variant's texture
//!
//! Tiers are created on demand by [`SvgCache::get_handle`] and torn down
//! bottom-up by [`SvgCache::release_handle`] once nothing references them.
//!
//! # Example
//! ```rust,ignore
//! use svg_cache::{CacheConfig, FitPolicy, SvgCache};
//! use svg_render::{Color, PixelSize, Point, RecordingRenderer};
//!
//! let mut cache = SvgCache::new(CacheConfig::default());
//! let mut backend = RecordingRenderer::new();
//!
//! if let Some(handle) = cache.get_handle("icons/star.svg", PixelSize::new(32, 32), FitPolicy::Stretch, Color::WHITE) {
//!     cache.render(handle, Point::new(10.0, 10.0), &mut backend);
//!     cache.release_handle(handle);
//! }
//! cache.collect_garbage(&mut backend);
//! ```

mod cache;
mod config;
mod element;
mod engine;
mod error;
mod files;
mod key;
mod presentation;

// Tiers
pub mod arena;
pub mod color_variant;
pub mod document;
pub mod handle;
pub mod size_variant;

#[cfg(test)]
mod testing;

pub use cache::{CacheStats, SvgCache};
pub use config::CacheConfig;
pub use element::{SvgElement, join_path};
pub use engine::{Bounds, ResvgDocument, ResvgEngine, VectorDocument, VectorEngine, fit_transform};
pub use error::{LoadError, RasterError};
pub use files::{FileInterface, FsFileInterface, MemoryFileInterface};
pub use handle::SvgHandle;
pub use key::{FitPolicy, HandleKey, hash_key};
pub use presentation::{BoxArea, BoxDimensions, EdgeSizes, Presentation, PresentationContext, render_dimensions, tint_color};
