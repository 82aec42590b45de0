//! Color-variant tier
//!
//! Per size variant, one tinted quad per color. Meshes are built once and
//! never mutated; a color change always goes through a new handle.

use svg_render::{Color, Geometry, PixelSize, Point, TextureId};

/// A tinted quad bound to its size variant's texture
#[derive(Debug)]
pub struct ColorVariant {
    color: Color,
    ref_count: usize,
    geometry: Geometry,
}

impl ColorVariant {
    pub fn color(&self) -> Color {
        self.color
    }

    /// Number of live handles pointing at this variant
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

/// Outcome of [`ColorVariantStore::release`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRelease {
    /// Still referenced
    Retained,
    /// Removed; `emptied` is set when it was the last color of its size variant
    Removed { emptied: bool },
}

/// Color variants of one size variant. Linear scan, exact color match (alpha included).
#[derive(Debug, Default)]
pub struct ColorVariantStore {
    variants: Vec<ColorVariant>,
}

impl ColorVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, color: Color) -> Option<&ColorVariant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// Take a reference on the variant for `color`, building its quad
    /// (`(0,0)..render_size`, full texture extent) if it does not exist yet.
    /// Returns whether it was created.
    pub fn get_or_create(&mut self, color: Color, render_size: PixelSize, texture: TextureId) -> (&ColorVariant, bool) {
        let (index, created) = match self.variants.iter().position(|v| v.color == color) {
            Some(i) => {
                self.variants[i].ref_count += 1;
                (i, false)
            }
            None => {
                let size = Point::new(render_size.width as f32, render_size.height as f32);
                self.variants.push(ColorVariant {
                    color,
                    ref_count: 1,
                    geometry: Geometry::textured_quad(Point::ZERO, size, color, texture),
                });
                (self.variants.len() - 1, true)
            }
        };

        (&self.variants[index], created)
    }

    /// Drop one reference on `color`'s variant. `None` if there is no such variant.
    pub fn release(&mut self, color: Color) -> Option<ColorRelease> {
        let index = self.variants.iter().position(|v| v.color == color)?;
        let variant = &mut self.variants[index];
        variant.ref_count -= 1;
        if variant.ref_count > 0 {
            return Some(ColorRelease::Retained);
        }

        self.variants.swap_remove(index);
        Some(ColorRelease::Removed {
            emptied: self.variants.is_empty(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorVariant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
