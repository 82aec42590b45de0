//! SVG element
//!
//! A displayed SVG that keeps at most one cache handle and swaps it when its
//! source, size or tint changes.

use svg_render::{Point, RenderInterface};

use crate::cache::SvgCache;
use crate::engine::VectorEngine;
use crate::handle::SvgHandle;
use crate::key::FitPolicy;
use crate::presentation::{BoxArea, PresentationContext};

/// Cache consumer for one element. Call [`detach`](Self::detach) before
/// dropping it, the element cannot reach the cache on its own.
#[derive(Debug)]
pub struct SvgElement {
    src: String,
    base_url: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    fit: FitPolicy,
    area: BoxArea,
    /// `src` joined onto the base URL
    source_path: String,
    handle: Option<SvgHandle>,
    intrinsic: Point,
    source_dirty: bool,
    dirty: bool,
}

impl Default for SvgElement {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgElement {
    pub fn new() -> Self {
        Self {
            src: String::new(),
            base_url: None,
            width: None,
            height: None,
            fit: FitPolicy::Stretch,
            area: BoxArea::Content,
            source_path: String::new(),
            handle: None,
            intrinsic: Point::ZERO,
            source_dirty: false,
            dirty: true,
        }
    }

    #[must_use]
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.set_src(src);
        self
    }

    /// URL of the owning document; relative sources resolve against it
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self.source_dirty = true;
        self
    }

    pub fn set_src(&mut self, src: impl Into<String>) {
        self.src = src.into();
        self.source_dirty = true;
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Resolved source of the last update
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// `width` attribute; overrides the reported intrinsic width
    pub fn set_width(&mut self, width: Option<f32>) {
        self.width = width;
    }

    /// `height` attribute; overrides the reported intrinsic height
    pub fn set_height(&mut self, height: Option<f32>) {
        self.height = height;
    }

    pub fn set_fit(&mut self, fit: FitPolicy) {
        if self.fit != fit {
            self.fit = fit;
            self.dirty = true;
        }
    }

    pub fn fit(&self) -> FitPolicy {
        self.fit
    }

    /// The element's box changed size
    pub fn on_resize(&mut self) {
        self.dirty = true;
    }

    /// Image color or opacity changed
    pub fn on_presentation_change(&mut self) {
        self.dirty = true;
    }

    pub fn handle(&self) -> Option<SvgHandle> {
        self.handle
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.source_dirty
    }

    /// Bring the held handle in line with the current source and presentation.
    ///
    /// The new handle is acquired before the old one is released, so a size
    /// or color change reuses the already loaded document.
    pub fn update<E: VectorEngine>(&mut self, cache: &mut SvgCache<E>, ctx: &dyn PresentationContext) {
        if !self.dirty && !self.source_dirty {
            return;
        }

        if self.source_dirty {
            self.source_path = match &self.base_url {
                Some(base) if !self.src.is_empty() => join_path(base, &self.src),
                _ => self.src.clone(),
            };
            self.source_dirty = false;
        }
        self.dirty = false;

        if self.source_path.is_empty() {
            self.clear(cache);
            return;
        }

        let Some(handle) = cache.get_handle_for(&self.source_path, ctx, self.area, self.fit) else {
            self.clear(cache);
            return;
        };

        self.intrinsic = cache.geometry(handle).map_or(Point::ZERO, |(_, dims)| dims);
        if let Some(old) = self.handle.replace(handle) {
            cache.release_handle(old);
        }
    }

    /// Intrinsic size for layout, with `width`/`height` overrides applied, and
    /// the aspect ratio when the height is positive. `None` without a source.
    pub fn intrinsic_dimensions<E: VectorEngine>(
        &mut self,
        cache: &mut SvgCache<E>,
        ctx: &dyn PresentationContext,
    ) -> Option<(Point, Option<f32>)> {
        if self.source_path.is_empty() && !self.source_dirty {
            return None;
        }
        self.update(cache, ctx);

        let dims = Point::new(
            self.width.unwrap_or(self.intrinsic.x),
            self.height.unwrap_or(self.intrinsic.y),
        );
        let ratio = (dims.y > 0.0).then(|| dims.x / dims.y);
        Some((dims, ratio))
    }

    /// Update, then draw at `offset` (the content box origin)
    pub fn render<E: VectorEngine>(
        &mut self,
        cache: &mut SvgCache<E>,
        ctx: &dyn PresentationContext,
        offset: Point,
        backend: &mut dyn RenderInterface,
    ) -> bool {
        self.update(cache, ctx);
        match self.handle {
            Some(handle) => cache.render(handle, offset, backend),
            None => false,
        }
    }

    /// Give the handle back. The next update acquires a fresh one.
    pub fn detach<E: VectorEngine>(&mut self, cache: &mut SvgCache<E>) {
        self.clear(cache);
        self.dirty = true;
    }

    fn clear<E: VectorEngine>(&mut self, cache: &mut SvgCache<E>) {
        if let Some(handle) = self.handle.take() {
            cache.release_handle(handle);
        }
        self.intrinsic = Point::ZERO;
    }
}

impl Drop for SvgElement {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            tracing::warn!("SVG element {} dropped while holding handle {}", self.source_path, handle.get());
        }
    }
}

/// Resolve `path` against the directory of `base`. Absolute paths and URLs
/// are returned as is.
pub fn join_path(base: &str, path: &str) -> String {
    if path.starts_with('/') || path.contains("://") {
        return path.to_owned();
    }

    let mut segments: Vec<&str> = match base.rfind('/') {
        Some(i) => base[..i].split('/').collect(),
        None => Vec::new(),
    };
    for segment in path.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                if segments.last().is_some_and(|s| !s.is_empty() && !s.ends_with(':')) {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
