//! fOS SVG Render - Backend Boundary
//!
//! The pieces of the rendering backend the SVG cache talks to.
//!
//! This crate provides:
//! - RGBA colors and 2D points
//! - Textured, tinted geometry (vertex/index buffers + texture binding)
//! - A lazily realized texture database
//! - The `RenderInterface` trait a backend implements
//! - A recording backend for headless use and tests

mod backend;
mod geometry;
mod texture;

pub use backend::{RecordingRenderer, RenderCommand, RenderInterface, TextureHandle};
pub use geometry::{Geometry, Vertex, generate_quad};
pub use texture::{PixelBuffer, TextureDatabase, TextureError, TextureId};

/// Color (RGBA)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with the alpha channel scaled by `opacity` (clamped to 0..=1)
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self { a: (opacity * self.a as f32) as u8, ..self }
    }

    /// Pack into a single `u32` (0xRRGGBBAA)
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

/// 2D point / vector in layout units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bytes needed for an RGBA8 buffer of this size
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}
