//! SVG Cache
//!
//! The facade over the three tiers. Callers hold [`SvgHandle`]s; everything
//! behind a handle (document, size variant, color variant) is shared and
//! reference counted, and torn down bottom-up when the last handle goes.

use svg_render::{Color, Geometry, PixelSize, Point, RenderInterface, TextureDatabase, TextureError, TextureHandle, TextureId};

use crate::color_variant::{ColorRelease, ColorVariant};
use crate::config::CacheConfig;
use crate::document::DocumentStore;
use crate::engine::{ResvgEngine, VectorEngine};
use crate::files::{FileInterface, FsFileInterface};
use crate::handle::{HandleEntry, HandleRelease, HandleTable, SvgHandle};
use crate::key::{FitPolicy, HandleKey};
use crate::presentation::{BoxArea, PresentationContext, render_dimensions, tint_color};
use crate::size_variant::{RasterSource, rasterize};

/// Snapshot of the cache's contents and lifetime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub documents: usize,
    pub size_variants: usize,
    pub color_variants: usize,
    pub handles: usize,
    /// Size variants whose texture currently lives in the backend
    pub realized_textures: usize,
    pub hits: u64,
    pub misses: u64,
    pub load_failures: u64,
    pub rasterizations: u64,
    /// Size variants that could not be rasterized; each is attempted once
    pub raster_failures: u64,
    pub meshes_built: u64,
}

/// Reference-counted cache of rasterized, tinted SVG render data
pub struct SvgCache<E: VectorEngine = ResvgEngine> {
    config: CacheConfig,
    engine: E,
    files: Box<dyn FileInterface>,
    documents: DocumentStore<E::Document>,
    handles: HandleTable,
    textures: TextureDatabase<RasterSource>,
    hits: u64,
    misses: u64,
    load_failures: u64,
    meshes_built: u64,
}

impl SvgCache<ResvgEngine> {
    /// Cache reading from the filesystem and rendering with resvg
    pub fn new(config: CacheConfig) -> Self {
        let engine = ResvgEngine::with_resources_dir(config.resources_dir.clone());
        let files = FsFileInterface::new(config.resources_dir.clone());
        Self::with_engine(config, engine, files)
    }
}

impl Default for SvgCache<ResvgEngine> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<E: VectorEngine> SvgCache<E> {
    pub fn with_engine(config: CacheConfig, engine: E, files: impl FileInterface + 'static) -> Self {
        Self {
            config,
            engine,
            files: Box::new(files),
            documents: DocumentStore::new(),
            handles: HandleTable::new(),
            textures: TextureDatabase::new(),
            hits: 0,
            misses: 0,
            load_failures: 0,
            meshes_built: 0,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Acquire a handle for one render configuration.
    ///
    /// A live handle for the same configuration is returned again with its
    /// count bumped. Otherwise the missing tiers are created; the texture is
    /// only registered here and rasterized when first drawn. Returns `None`
    /// (and logs) if the source cannot be loaded, leaving the cache untouched.
    pub fn get_handle(&mut self, source: &str, dimensions: PixelSize, fit: FitPolicy, color: Color) -> Option<SvgHandle> {
        let key = HandleKey::new(source, dimensions, fit, color);
        if let Some(handle) = self.handles.acquire(&key) {
            self.hits += 1;
            tracing::trace!("SVG handle {} hit for {}", handle.get(), source);
            return Some(handle);
        }
        self.misses += 1;

        let (document_id, document) = match self.documents.get_or_load(source, self.files.as_ref(), &self.engine) {
            Ok(found) => found,
            Err(err) => {
                self.load_failures += 1;
                tracing::warn!("{}", err);
                return None;
            }
        };
        let intrinsic = document.fitted_dimensions(fit);

        let textures = &mut self.textures;
        let (size, _) = document.sizes_mut().get_or_create(dimensions, fit, || {
            textures.insert(RasterSource {
                document: document_id,
                dimensions,
                fit,
            })
        });
        let texture = size.texture();

        let (_, created) = size.colors_mut().get_or_create(color, dimensions, texture);
        if created {
            self.meshes_built += 1;
            tracing::debug!("Created SVG color variant {:08x} for {}", color.to_u32(), source);
        }

        Some(self.handles.insert(key, document_id, intrinsic))
    }

    /// [`get_handle`](Self::get_handle) with dimensions and tint taken from
    /// the element presenting the SVG
    pub fn get_handle_for(
        &mut self,
        source: &str,
        ctx: &dyn PresentationContext,
        area: BoxArea,
        fit: FitPolicy,
    ) -> Option<SvgHandle> {
        self.get_handle(source, render_dimensions(ctx, area), fit, tint_color(ctx))
    }

    /// Drop one reference. The last release tears down the color variant,
    /// then its size variant and the document once they are empty.
    ///
    /// # Panics
    /// If `handle` is not live, or its tier chain is broken.
    pub fn release_handle(&mut self, handle: SvgHandle) {
        let entry = match self.handles.release(handle) {
            Some(HandleRelease::Retained { remaining }) => {
                tracing::trace!("SVG handle {} released, {} left", handle.get(), remaining);
                return;
            }
            Some(HandleRelease::Evicted(entry)) => entry,
            None => panic!("Released unknown SVG handle {}", handle.get()),
        };

        let key = entry.key();
        let document_id = entry.document();
        let Some(document) = self.documents.get_mut(document_id) else {
            panic!("SVG handle {} outlived document {}", handle.get(), key.source);
        };
        let Some(size) = document.sizes_mut().find_mut(key.dimensions, key.fit) else {
            panic!("SVG handle {} has no size variant in {}", handle.get(), key.source);
        };

        match size.colors_mut().release(key.color) {
            Some(ColorRelease::Removed { emptied: true }) => {}
            Some(_) => return,
            None => panic!("SVG handle {} has no color variant in {}", handle.get(), key.source),
        }

        if let Some(texture) = document.sizes_mut().remove(key.dimensions, key.fit) {
            self.textures.remove(texture);
            tracing::debug!(
                "Evicted SVG size variant {}x{} of {}",
                key.dimensions.width,
                key.dimensions.height,
                key.source
            );
        }

        if document.sizes().is_empty() {
            self.documents.remove(document_id);
        }
    }

    /// The mesh and reported dimensions behind a handle. `None` for a handle
    /// that is not live.
    pub fn geometry(&self, handle: SvgHandle) -> Option<(&Geometry, Point)> {
        let entry = self.handles.get(handle)?;
        match self.color_variant(entry) {
            Some(variant) => Some((variant.geometry(), entry.intrinsic_dimensions())),
            None => {
                if cfg!(debug_assertions) {
                    panic!("SVG handle {} is live but its tier chain is broken", handle.get());
                }
                None
            }
        }
    }

    fn color_variant(&self, entry: &HandleEntry) -> Option<&ColorVariant> {
        let key = entry.key();
        self.documents
            .get(entry.document())?
            .sizes()
            .find(key.dimensions, key.fit)?
            .colors()
            .find(key.color)
    }

    /// Rasterize and upload the handle's texture if it is not in the backend yet.
    /// A size variant that failed to rasterize keeps failing without another
    /// attempt; a failed upload is retried on the next call.
    pub fn realize(
        &mut self,
        handle: SvgHandle,
        backend: &mut dyn RenderInterface,
    ) -> Result<(TextureHandle, PixelSize), TextureError> {
        let texture = self
            .geometry(handle)
            .and_then(|(geometry, _)| geometry.texture())
            .ok_or(TextureError::Stale)?;
        self.realize_texture(texture, backend)
    }

    fn realize_texture(
        &mut self,
        texture: TextureId,
        backend: &mut dyn RenderInterface,
    ) -> Result<(TextureHandle, PixelSize), TextureError> {
        let documents = &self.documents;
        let max_texture_size = self.config.max_texture_size;

        self.textures.ensure_loaded(texture, backend, |source| {
            let document = documents.get(source.document).ok_or(TextureError::Stale)?;
            rasterize(document, source.dimensions, source.fit, max_texture_size).map_err(|err| {
                tracing::warn!("Could not rasterize SVG {}: {}", document.source(), err);
                TextureError::Raster(err.to_string())
            })
        })
    }

    /// Draw the handle's quad at `offset`. Returns whether anything was drawn.
    pub fn render(&mut self, handle: SvgHandle, offset: Point, backend: &mut dyn RenderInterface) -> bool {
        let texture = match self.realize(handle, backend) {
            Ok((texture, _)) => texture,
            Err(err) => {
                tracing::debug!("Skipping SVG handle {}: {}", handle.get(), err);
                return false;
            }
        };

        let Some((geometry, _)) = self.geometry(handle) else {
            return false;
        };
        geometry.render(backend, offset, Some(texture));
        true
    }

    /// Free backend textures of evicted size variants. Returns how many were freed.
    pub fn collect_garbage(&mut self, backend: &mut dyn RenderInterface) -> usize {
        self.textures.release_pending(backend)
    }

    /// Free every backend texture, e.g. on context loss. Live handles
    /// rasterize again the next time they are drawn.
    pub fn release_textures(&mut self, backend: &mut dyn RenderInterface) {
        self.textures.release_all(backend);
    }

    /// Drop every tier at once without per-handle teardown. Outstanding
    /// handles become invalid. Realized textures are freed by the next
    /// [`collect_garbage`](Self::collect_garbage).
    pub fn reset(&mut self) {
        let handles = self.handles.len();
        self.handles.clear();
        self.documents.clear();
        self.textures.clear();
        tracing::debug!("SVG cache reset, dropped {} handles", handles);
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            documents: self.documents.len(),
            handles: self.handles.len(),
            hits: self.hits,
            misses: self.misses,
            load_failures: self.load_failures,
            rasterizations: self.textures.realizations(),
            raster_failures: self.textures.failures(),
            meshes_built: self.meshes_built,
            ..CacheStats::default()
        };

        for (_, document) in self.documents.iter() {
            for size in document.sizes().iter() {
                stats.size_variants += 1;
                stats.color_variants += size.colors().len();
                if self.textures.is_realized(size.texture()) {
                    stats.realized_textures += 1;
                }
            }
        }
        stats
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    pub fn contains_document(&self, source: &str) -> bool {
        self.documents.find(source).is_some()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn size_variant_count(&self, source: &str) -> usize {
        self.documents
            .find(source)
            .and_then(|id| self.documents.get(id))
            .map_or(0, |doc| doc.sizes().len())
    }

    pub fn color_variant_count(&self, source: &str, dimensions: PixelSize, fit: FitPolicy) -> usize {
        self.documents
            .find(source)
            .and_then(|id| self.documents.get(id))
            .and_then(|doc| doc.sizes().find(dimensions, fit))
            .map_or(0, |size| size.colors().len())
    }

    /// Outstanding references on `handle`, zero if it is not live
    pub fn handle_ref_count(&self, handle: SvgHandle) -> usize {
        self.handles.get(handle).map_or(0, HandleEntry::ref_count)
    }
}
