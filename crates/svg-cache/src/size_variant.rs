//! Size-variant tier
//!
//! Per document, one lazily rasterized texture per (pixel size, fit policy).

use svg_render::{PixelBuffer, PixelSize, TextureId};
use tiny_skia::Pixmap;

use crate::color_variant::ColorVariantStore;
use crate::document::{Document, DocumentId};
use crate::engine::{VectorDocument, fit_transform};
use crate::error::RasterError;
use crate::key::FitPolicy;

/// What a size variant's texture is rendered from. Resolved through the
/// document store when the texture is pulled, never held as a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSource {
    pub document: DocumentId,
    pub dimensions: PixelSize,
    pub fit: FitPolicy,
}

/// One rendering size of a document
#[derive(Debug)]
pub struct SizeVariant {
    dimensions: PixelSize,
    fit: FitPolicy,
    texture: TextureId,
    colors: ColorVariantStore,
}

impl SizeVariant {
    pub fn dimensions(&self) -> PixelSize {
        self.dimensions
    }

    pub fn fit(&self) -> FitPolicy {
        self.fit
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn colors(&self) -> &ColorVariantStore {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut ColorVariantStore {
        &mut self.colors
    }

    fn matches(&self, dimensions: PixelSize, fit: FitPolicy) -> bool {
        self.dimensions == dimensions && self.fit == fit
    }
}

/// Size variants of one document. Small, so a linear scan; order is not kept.
#[derive(Debug, Default)]
pub struct SizeVariantStore {
    variants: Vec<SizeVariant>,
}

impl SizeVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, dimensions: PixelSize, fit: FitPolicy) -> Option<&SizeVariant> {
        self.variants.iter().find(|v| v.matches(dimensions, fit))
    }

    pub fn find_mut(&mut self, dimensions: PixelSize, fit: FitPolicy) -> Option<&mut SizeVariant> {
        self.variants.iter_mut().find(|v| v.matches(dimensions, fit))
    }

    /// Find the variant or create it. `create_texture` registers the (unrealized)
    /// texture and only runs on creation. Returns whether it was created.
    pub fn get_or_create<F>(&mut self, dimensions: PixelSize, fit: FitPolicy, create_texture: F) -> (&mut SizeVariant, bool)
    where
        F: FnOnce() -> TextureId,
    {
        let (index, created) = match self.variants.iter().position(|v| v.matches(dimensions, fit)) {
            Some(i) => (i, false),
            None => {
                self.variants.push(SizeVariant {
                    dimensions,
                    fit,
                    texture: create_texture(),
                    colors: ColorVariantStore::new(),
                });
                tracing::debug!("Created SVG size variant {}x{} {:?}", dimensions.width, dimensions.height, fit);
                (self.variants.len() - 1, true)
            }
        };

        (&mut self.variants[index], created)
    }

    /// Remove a variant and hand back its texture for destruction.
    ///
    /// # Panics
    /// If the variant still has color variants.
    pub fn remove(&mut self, dimensions: PixelSize, fit: FitPolicy) -> Option<TextureId> {
        let index = self.variants.iter().position(|v| v.matches(dimensions, fit))?;
        assert!(
            self.variants[index].colors.is_empty(),
            "SVG size variant {}x{} removed with {} live color variants",
            dimensions.width,
            dimensions.height,
            self.variants[index].colors.len()
        );
        Some(self.variants.swap_remove(index).texture)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SizeVariant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Render `document` into a fresh `dimensions`-sized RGBA buffer.
pub fn rasterize<D: VectorDocument>(
    document: &Document<D>,
    dimensions: PixelSize,
    fit: FitPolicy,
    max_texture_size: u32,
) -> Result<PixelBuffer, RasterError> {
    let PixelSize { width, height } = dimensions;
    if width > max_texture_size || height > max_texture_size {
        return Err(RasterError::TooLarge {
            width,
            height,
            max: max_texture_size,
        });
    }

    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;

    let intrinsic = document.intrinsic_dimensions();
    let transform = fit_transform((intrinsic.x, intrinsic.y), document.content_bounds(), dimensions, fit);
    document.parsed().render(&mut pixmap.as_mut(), transform);

    Ok(PixelBuffer::from_pixmap(pixmap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStore;
    use crate::engine::Bounds;
    use crate::files::MemoryFileInterface;
    use crate::testing::{StubEngine, stub_svg};
    use svg_render::{Color, TextureDatabase};

    const DIMS: PixelSize = PixelSize::new(32, 32);

    #[test]
    fn test_get_or_create_registers_texture_once() {
        let mut store = SizeVariantStore::new();
        let mut textures = TextureDatabase::new();

        let (a, created) = store.get_or_create(DIMS, FitPolicy::Stretch, || textures.insert(()));
        let a = a.texture();
        assert!(created);

        let (b, created) = store.get_or_create(DIMS, FitPolicy::Stretch, || textures.insert(()));
        assert!(!created);
        assert_eq!(a, b.texture());
        assert_eq!(textures.len(), 1);
    }

    #[test]
    fn test_fit_policy_is_part_of_identity() {
        let mut store = SizeVariantStore::new();
        let mut textures = TextureDatabase::new();

        store.get_or_create(DIMS, FitPolicy::Stretch, || textures.insert(()));
        store.get_or_create(DIMS, FitPolicy::ContentFit, || textures.insert(()));

        assert_eq!(store.len(), 2);
        assert_ne!(
            store.find(DIMS, FitPolicy::Stretch).unwrap().texture(),
            store.find(DIMS, FitPolicy::ContentFit).unwrap().texture()
        );
    }

    #[test]
    fn test_remove_is_unordered_and_returns_texture() {
        let mut store = SizeVariantStore::new();
        let mut textures = TextureDatabase::new();
        let sizes = [PixelSize::new(8, 8), PixelSize::new(16, 16), PixelSize::new(24, 24)];
        for size in sizes {
            store.get_or_create(size, FitPolicy::Stretch, || textures.insert(()));
        }
        let middle = store.find(sizes[1], FitPolicy::Stretch).unwrap().texture();

        assert_eq!(store.remove(sizes[1], FitPolicy::Stretch), Some(middle));
        assert_eq!(store.len(), 2);
        assert!(store.find(sizes[0], FitPolicy::Stretch).is_some());
        assert!(store.find(sizes[2], FitPolicy::Stretch).is_some());
        assert_eq!(store.remove(sizes[1], FitPolicy::Stretch), None);
    }

    #[test]
    #[should_panic(expected = "live color variants")]
    fn test_remove_with_colors_panics() {
        let mut store = SizeVariantStore::new();
        let mut textures = TextureDatabase::new();
        let (variant, _) = store.get_or_create(DIMS, FitPolicy::Stretch, || textures.insert(()));
        let texture = variant.texture();
        variant.colors_mut().get_or_create(Color::RED, DIMS, texture);

        store.remove(DIMS, FitPolicy::Stretch);
    }

    #[test]
    fn test_rasterize_uses_fit_transform() {
        let files = MemoryFileInterface::new()
            .with_file("a.svg", stub_svg(100.0, 50.0, Some(Bounds::new(10.0, 10.0, 80.0, 30.0))));
        let engine = StubEngine::default();
        let mut docs = DocumentStore::new();
        let (_, doc) = docs.get_or_load("a.svg", &files, &engine).unwrap();

        let buffer = rasterize(doc, PixelSize::new(160, 60), FitPolicy::ContentFit, 8192).unwrap();
        assert_eq!(buffer.size(), PixelSize::new(160, 60));

        let t = engine.last_transform().unwrap();
        assert_eq!((t.sx, t.sy, t.tx, t.ty), (2.0, 2.0, -20.0, -20.0));

        rasterize(doc, PixelSize::new(200, 50), FitPolicy::Stretch, 8192).unwrap();
        let t = engine.last_transform().unwrap();
        assert_eq!((t.sx, t.sy, t.tx, t.ty), (2.0, 1.0, 0.0, 0.0));
        assert_eq!(engine.render_count(), 2);
    }

    #[test]
    fn test_rasterize_rejects_bad_sizes() {
        let files = MemoryFileInterface::new().with_file("a.svg", stub_svg(10.0, 10.0, None));
        let engine = StubEngine::default();
        let mut docs = DocumentStore::new();
        let (_, doc) = docs.get_or_load("a.svg", &files, &engine).unwrap();

        assert_eq!(
            rasterize(doc, PixelSize::new(0, 10), FitPolicy::Stretch, 8192),
            Err(RasterError::InvalidSize { width: 0, height: 10 })
        );
        assert_eq!(
            rasterize(doc, PixelSize::new(64, 8), FitPolicy::Stretch, 32),
            Err(RasterError::TooLarge { width: 64, height: 8, max: 32 })
        );
        assert_eq!(engine.render_count(), 0);
    }
}
