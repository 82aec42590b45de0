//! Textured geometry
//!
//! Vertex/index buffers bound to a texture, plus quad generation.

use crate::backend::{RenderInterface, TextureHandle};
use crate::texture::TextureId;
use crate::{Color, Point};

/// A single vertex: position, tint color and texture coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Point,
    pub color: Color,
    pub tex_coord: Point,
}

/// Indexed triangle geometry with an optional texture binding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    texture: Option<TextureId>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices, texture: None }
    }

    /// Single textured quad spanning `origin..origin + size` with full-extent texture coordinates
    pub fn textured_quad(origin: Point, size: Point, color: Color, texture: TextureId) -> Self {
        let (vertices, indices) = generate_quad(origin, size, color, Point::ZERO, Point::new(1.0, 1.0));
        Self {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            texture: Some(texture),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Texture this geometry samples from
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Submit to the backend at `translation`. The caller resolves the texture
    /// binding to a realized backend handle first.
    pub fn render(&self, backend: &mut dyn RenderInterface, translation: Point, texture: Option<TextureHandle>) {
        if self.is_empty() {
            return;
        }
        backend.render_geometry(&self.vertices, &self.indices, translation, texture);
    }
}

/// Build a quad as two triangles.
///
/// Vertices run clockwise from the top-left corner; texture coordinates map
/// `tex_top_left` and `tex_bottom_right` onto the matching corners.
pub fn generate_quad(
    origin: Point,
    size: Point,
    color: Color,
    tex_top_left: Point,
    tex_bottom_right: Point,
) -> ([Vertex; 4], [u32; 6]) {
    let vertices = [
        Vertex {
            position: origin,
            color,
            tex_coord: tex_top_left,
        },
        Vertex {
            position: Point::new(origin.x + size.x, origin.y),
            color,
            tex_coord: Point::new(tex_bottom_right.x, tex_top_left.y),
        },
        Vertex {
            position: Point::new(origin.x + size.x, origin.y + size.y),
            color,
            tex_coord: tex_bottom_right,
        },
        Vertex {
            position: Point::new(origin.x, origin.y + size.y),
            color,
            tex_coord: Point::new(tex_top_left.x, tex_bottom_right.y),
        },
    ];

    (vertices, [0, 3, 1, 1, 3, 2])
}
