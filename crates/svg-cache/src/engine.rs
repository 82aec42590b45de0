//! Vector-graphic engine
//!
//! Parsing and rasterization of SVG data, behind a trait so the cache does not
//! care which engine produced a document. [`ResvgEngine`] is the default.

use std::error::Error as StdError;
use std::path::PathBuf;

use resvg::usvg;
use svg_render::PixelSize;
use tiny_skia::{PixmapMut, Transform};

use crate::key::FitPolicy;

/// Axis-aligned rectangle in document units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Zero or negative area, or non-finite
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.x.is_finite() && self.y.is_finite())
    }
}

/// A parsed vector-graphic document
pub trait VectorDocument {
    /// Nominal canvas size as reported by the document (may be zero for malformed data)
    fn native_size(&self) -> (f32, f32);

    /// Tight bounding box of the drawn content, in document units
    fn content_bounds(&self) -> Option<Bounds>;

    /// Draw into `pixmap` with `transform` mapping document units to pixels
    fn render(&self, pixmap: &mut PixmapMut<'_>, transform: Transform);
}

/// Parses raw bytes into documents
pub trait VectorEngine {
    type Document: VectorDocument;

    fn parse(&self, data: &[u8]) -> Result<Self::Document, Box<dyn StdError + Send + Sync>>;
}

/// Transform from document units onto a `target`-sized pixel grid.
///
/// `native` is the (already clamped) intrinsic size. For [`FitPolicy::ContentFit`]
/// an empty or missing content box falls back to the full canvas.
pub fn fit_transform(
    native: (f32, f32),
    content: Option<Bounds>,
    target: PixelSize,
    fit: FitPolicy,
) -> Transform {
    let (tw, th) = (target.width as f32, target.height as f32);

    match fit {
        FitPolicy::Stretch => Transform::from_scale(tw / native.0, th / native.1),
        FitPolicy::ContentFit => {
            let b = content
                .filter(|b| !b.is_empty())
                .unwrap_or(Bounds::new(0.0, 0.0, native.0, native.1));
            let sx = tw / b.width;
            let sy = th / b.height;
            Transform::from_row(sx, 0.0, 0.0, sy, -b.x * sx, -b.y * sy)
        }
    }
}

// ============================================================================
// resvg
// ============================================================================

/// Engine backed by usvg parsing and resvg rendering
#[derive(Debug, Default)]
pub struct ResvgEngine {
    resources_dir: Option<PathBuf>,
}

impl ResvgEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve nested resources (images, fonts) relative to `dir`
    pub fn with_resources_dir(dir: Option<PathBuf>) -> Self {
        Self { resources_dir: dir }
    }
}

impl VectorEngine for ResvgEngine {
    type Document = ResvgDocument;

    fn parse(&self, data: &[u8]) -> Result<ResvgDocument, Box<dyn StdError + Send + Sync>> {
        let options = usvg::Options {
            resources_dir: self.resources_dir.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(data, &options)?;
        Ok(ResvgDocument { tree })
    }
}

/// A usvg tree
pub struct ResvgDocument {
    tree: usvg::Tree,
}

impl std::fmt::Debug for ResvgDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.tree.size();
        f.debug_struct("ResvgDocument")
            .field("width", &size.width())
            .field("height", &size.height())
            .finish()
    }
}

impl VectorDocument for ResvgDocument {
    fn native_size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }

    fn content_bounds(&self) -> Option<Bounds> {
        if !self.tree.root().has_children() {
            return None;
        }
        let rect = self.tree.root().abs_bounding_box();
        let bounds = Bounds::new(rect.x(), rect.y(), rect.width(), rect.height());
        (!bounds.is_empty()).then_some(bounds)
    }

    fn render(&self, pixmap: &mut PixmapMut<'_>, transform: Transform) {
        resvg::render(&self.tree, transform, pixmap);
    }
}
