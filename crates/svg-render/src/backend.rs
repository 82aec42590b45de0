//! Render interface
//!
//! The operations the cache needs from a rendering backend, and a backend
//! that simply records them.

use std::collections::HashMap;

use crate::geometry::Vertex;
use crate::{PixelSize, Point};

/// Backend-owned texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Rendering backend
pub trait RenderInterface {
    /// Upload RGBA8 pixels. Returns `None` if the backend could not create the texture.
    fn generate_texture(&mut self, pixels: &[u8], size: PixelSize) -> Option<TextureHandle>;

    /// Free a texture previously returned by `generate_texture`
    fn release_texture(&mut self, texture: TextureHandle);

    /// Draw indexed triangles at `translation`
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        translation: Point,
        texture: Option<TextureHandle>,
    );
}

/// A command received by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    GenerateTexture { handle: TextureHandle, size: PixelSize },
    ReleaseTexture(TextureHandle),
    RenderGeometry {
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        translation: Point,
        texture: Option<TextureHandle>,
    },
}

/// Headless backend that keeps uploaded pixels and records every command
#[derive(Debug)]
pub struct RecordingRenderer {
    next_id: u64,
    textures: HashMap<TextureHandle, (PixelSize, Vec<u8>)>,
    commands: Vec<RenderCommand>,
    /// Reject every texture upload (simulates a lost device)
    pub fail_uploads: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            textures: HashMap::new(),
            commands: Vec::new(),
            fail_uploads: false,
        }
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of textures uploaded and not yet released
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Pixels and size of a live texture
    pub fn texture(&self, handle: TextureHandle) -> Option<(PixelSize, &[u8])> {
        self.textures.get(&handle).map(|(size, pixels)| (*size, pixels.as_slice()))
    }

    /// Draw calls recorded so far
    pub fn draw_calls(&self) -> impl Iterator<Item = &RenderCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::RenderGeometry { .. }))
    }
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderInterface for RecordingRenderer {
    fn generate_texture(&mut self, pixels: &[u8], size: PixelSize) -> Option<TextureHandle> {
        if self.fail_uploads || pixels.len() != size.rgba_len() {
            return None;
        }

        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.textures.insert(handle, (size, pixels.to_vec()));
        self.commands.push(RenderCommand::GenerateTexture { handle, size });
        Some(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_none() {
            tracing::warn!("Release of unknown texture {:?}", texture);
        }
        self.commands.push(RenderCommand::ReleaseTexture(texture));
    }

    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        translation: Point,
        texture: Option<TextureHandle>,
    ) {
        self.commands.push(RenderCommand::RenderGeometry {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            translation,
            texture,
        });
    }
}
