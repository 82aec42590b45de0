//! Presentation context
//!
//! Deriving render dimensions and tint from the element that displays an SVG.

use svg_render::{Color, PixelSize, Point};

/// Which box of the element the SVG fills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoxArea {
    #[default]
    Content,
    Padding,
    Border,
    Margin,
}

/// Edge sizes (top, right, bottom, left)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub const fn all(value: f32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Box dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxDimensions {
    /// Content box size
    pub content: Point,
    pub padding: EdgeSizes,
    pub border: EdgeSizes,
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            content: Point::new(width, height),
            ..Self::default()
        }
    }

    /// Size of the given box
    pub fn size(&self, area: BoxArea) -> Point {
        let mut size = self.content;
        let mut grow = |edges: &EdgeSizes| {
            size.x += edges.horizontal();
            size.y += edges.vertical();
        };
        match area {
            BoxArea::Content => {}
            BoxArea::Padding => grow(&self.padding),
            BoxArea::Border => {
                grow(&self.padding);
                grow(&self.border);
            }
            BoxArea::Margin => {
                grow(&self.padding);
                grow(&self.border);
                grow(&self.margin);
            }
        }
        size
    }
}

/// What the cache needs to know about the element showing an SVG
pub trait PresentationContext {
    fn box_size(&self, area: BoxArea) -> Point;

    /// Computed `image-color`
    fn image_color(&self) -> Color;

    /// Computed opacity, 0..=1
    fn opacity(&self) -> f32;
}

/// Rounded pixel size of `area`
pub fn render_dimensions(ctx: &dyn PresentationContext, area: BoxArea) -> PixelSize {
    let size = ctx.box_size(area);
    PixelSize::new(size.x.round() as u32, size.y.round() as u32)
}

/// Image color with the opacity folded into its alpha
pub fn tint_color(ctx: &dyn PresentationContext) -> Color {
    ctx.image_color().with_opacity(ctx.opacity())
}

/// Plain-data presentation context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    pub box_model: BoxDimensions,
    pub image_color: Color,
    pub opacity: f32,
}

impl Presentation {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            box_model: BoxDimensions::new(width, height),
            image_color: Color::WHITE,
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.image_color = color;
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

impl PresentationContext for Presentation {
    fn box_size(&self, area: BoxArea) -> Point {
        self.box_model.size(area)
    }

    fn image_color(&self) -> Color {
        self.image_color
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}
