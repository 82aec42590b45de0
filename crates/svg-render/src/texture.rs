//! Lazy texture database
//!
//! Textures are registered with an opaque source descriptor and only turned
//! into backend textures when something pulls them. Realization goes through a
//! caller-supplied rasterizer that resolves the descriptor at call time, so the
//! database never holds a reference to whatever produces the pixels.

use std::collections::HashMap;

use crate::PixelSize;
use crate::backend::{RenderInterface, TextureHandle};

/// Identifier of a texture entry. Never reused within one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

/// RGBA8 pixels ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    size: PixelSize,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 data. Returns `None` if the length does not match `size`.
    pub fn new(pixels: Vec<u8>, size: PixelSize) -> Option<Self> {
        (pixels.len() == size.rgba_len()).then_some(Self { pixels, size })
    }

    /// Take the (premultiplied) RGBA8 data out of a tiny-skia pixmap
    pub fn from_pixmap(pixmap: tiny_skia::Pixmap) -> Self {
        let size = PixelSize::new(pixmap.width(), pixmap.height());
        Self {
            pixels: pixmap.take(),
            size,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        self.pixels.get(idx..idx + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Texture realization errors
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("Texture source no longer exists")]
    Stale,
    #[error("Unknown texture {0:?}")]
    Unknown(TextureId),
    #[error("Rasterization failed: {0}")]
    Raster(String),
    #[error("Backend could not create a {}x{} texture", .0.width, .0.height)]
    Backend(PixelSize),
}

#[derive(Debug)]
struct TextureEntry<S> {
    source: S,
    realized: Option<(TextureHandle, PixelSize)>,
    /// Rasterization error, kept so a broken source is not retried every pull
    failure: Option<String>,
}

/// Texture entries keyed by [`TextureId`], realized on demand
#[derive(Debug)]
pub struct TextureDatabase<S> {
    entries: HashMap<TextureId, TextureEntry<S>>,
    next_id: u64,
    /// Backend handles of removed entries, freed on the next backend access
    pending_release: Vec<TextureHandle>,
    /// Successful realizations over the database's lifetime
    realizations: u64,
    /// Rasterizations that failed over the database's lifetime
    failures: u64,
}

impl<S> TextureDatabase<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
            pending_release: Vec::new(),
            realizations: 0,
            failures: 0,
        }
    }

    /// Register a texture. Nothing is rasterized until it is pulled.
    pub fn insert(&mut self, source: S) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            TextureEntry {
                source,
                realized: None,
                failure: None,
            },
        );
        id
    }

    pub fn contains(&self, id: TextureId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove an entry. A realized backend texture is queued for release.
    pub fn remove(&mut self, id: TextureId) -> Option<S> {
        let entry = self.entries.remove(&id)?;
        if let Some((handle, _)) = entry.realized {
            self.pending_release.push(handle);
        }
        Some(entry.source)
    }

    pub fn is_realized(&self, id: TextureId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.realized.is_some())
    }

    /// Realized dimensions, if realized
    pub fn dimensions(&self, id: TextureId) -> Option<PixelSize> {
        self.entries.get(&id).and_then(|e| e.realized).map(|(_, s)| s)
    }

    /// Realize the texture if needed and return its backend handle.
    ///
    /// `rasterize` is only called when the entry is not realized yet. A
    /// [`TextureError::Raster`] is remembered and returned on later pulls
    /// without rasterizing again. Other failures leave the entry unrealized,
    /// so the next pull tries again.
    pub fn ensure_loaded<F>(
        &mut self,
        id: TextureId,
        backend: &mut dyn RenderInterface,
        rasterize: F,
    ) -> Result<(TextureHandle, PixelSize), TextureError>
    where
        F: FnOnce(&S) -> Result<PixelBuffer, TextureError>,
    {
        self.release_pending(backend);

        let entry = self.entries.get_mut(&id).ok_or(TextureError::Unknown(id))?;
        if let Some(realized) = entry.realized {
            return Ok(realized);
        }

        if let Some(reason) = &entry.failure {
            return Err(TextureError::Raster(reason.clone()));
        }

        let buffer = match rasterize(&entry.source) {
            Ok(buffer) => buffer,
            Err(TextureError::Raster(reason)) => {
                self.failures += 1;
                entry.failure = Some(reason.clone());
                return Err(TextureError::Raster(reason));
            }
            Err(err) => return Err(err),
        };
        let size = buffer.size();
        let handle = backend
            .generate_texture(buffer.pixels(), size)
            .ok_or(TextureError::Backend(size))?;

        entry.realized = Some((handle, size));
        self.realizations += 1;
        tracing::debug!("Realized texture {:?} at {}x{}", id, size.width, size.height);
        Ok((handle, size))
    }

    /// Free backend textures of removed entries. Returns how many were freed.
    pub fn release_pending(&mut self, backend: &mut dyn RenderInterface) -> usize {
        let count = self.pending_release.len();
        for handle in self.pending_release.drain(..) {
            backend.release_texture(handle);
        }
        count
    }

    /// Free every backend texture. Entries stay and realize again on the next pull.
    pub fn release_all(&mut self, backend: &mut dyn RenderInterface) {
        self.release_pending(backend);
        for entry in self.entries.values_mut() {
            if let Some((handle, _)) = entry.realized.take() {
                backend.release_texture(handle);
            }
        }
    }

    /// Drop every entry. Realized textures are queued for release.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            if let Some((handle, _)) = entry.realized {
                self.pending_release.push(handle);
            }
        }
    }

    /// Backend handles waiting to be released
    pub fn pending_releases(&self) -> usize {
        self.pending_release.len()
    }

    pub fn realizations(&self) -> u64 {
        self.realizations
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for TextureDatabase<S> {
    fn default() -> Self {
        Self::new()
    }
}
