use crate::foundation::{
    color::Color,
    core::{Affine, Canvas, FrameIndex, Point, Rect, Vec2},
};

/// One color stop of a gradient. `offset` is in 0..1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// How a shape is filled.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Top-to-bottom gradient across the shape's own bounding box.
    VerticalGradient(Vec<GradientStop>),
    /// Circular gradient in canvas space.
    Radial {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

/// Mix-blend mode applied when compositing an item or layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Blend {
    #[default]
    Normal,
    Screen,
    Difference,
    Overlay,
}

impl Blend {
    pub(crate) fn css_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Screen => "screen",
            Self::Difference => "difference",
            Self::Overlay => "overlay",
        }
    }
}

/// Procedural fractal noise filling a rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSpec {
    pub base_frequency: f64,
    pub octaves: u32,
    pub seed: u64,
    /// Drop color so the noise reads as luminance grain.
    pub monochrome: bool,
    /// Linear contrast gain around mid-grey (1.0 = unchanged).
    pub contrast: f64,
    /// Multiplier applied after contrast (1.0 = unchanged).
    pub brightness: f64,
}

/// Styled text anchored at its center.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub center: Point,
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    /// Soft neon halo radius; `0.0` disables it.
    pub glow: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect(Rect),
    /// Closed polygon in canvas space.
    Polygon(Vec<Point>),
    Circle { center: Point, radius: f64 },
    Text(TextRun),
    Noise { rect: Rect, noise: NoiseSpec },
    /// Horizontal stripes repeating every `period` pixels over `rect`.
    Stripes { rect: Rect, period: f64, thickness: f64 },
    /// Inner shadow hugging the edges of `rect`.
    InsetShadow { rect: Rect, spread: f64 },
}

/// A single drawable with its own style.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub shape: Shape,
    pub paint: Paint,
    pub opacity: f64,
    pub blend: Blend,
    /// Gaussian blur standard deviation in pixels.
    pub blur: f64,
    pub transform: Affine,
}

impl DrawItem {
    pub fn new(shape: Shape, paint: Paint) -> Self {
        Self {
            shape,
            paint,
            opacity: 1.0,
            blend: Blend::Normal,
            blur: 0.0,
            transform: Affine::IDENTITY,
        }
    }

    pub fn solid(shape: Shape, color: Color) -> Self {
        Self::new(shape, Paint::Solid(color))
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }

    /// Items that can never put a pixel on screen.
    pub fn is_invisible(&self) -> bool {
        !(self.opacity > 0.0)
    }
}

/// Compositing band of a layer. Stage layers share the perspective stage and
/// the chromatic split filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZBand {
    Backdrop,
    Stage,
    Title,
    Post,
}

/// Output of one layer for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerOutput {
    pub name: &'static str,
    pub band: ZBand,
    pub opacity: f64,
    pub blend: Blend,
    pub items: Vec<DrawItem>,
}

impl LayerOutput {
    pub fn new(name: &'static str, band: ZBand) -> Self {
        Self {
            name,
            band,
            opacity: 1.0,
            blend: Blend::Normal,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        if !item.is_invisible() {
            self.items.push(item);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() || !(self.opacity > 0.0)
    }
}

/// Fully evaluated frame, ready for serialization to SVG.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub frame: FrameIndex,
    pub canvas: Canvas,
    pub background: Color,
    /// Whole-frame translation (crash shake).
    pub shake: Vec2,
    /// Horizontal offset of the red fringe around stage layers; `0.0` disables it.
    pub chromatic: f64,
    pub layers: Vec<LayerOutput>,
}

impl Scene {
    pub fn layer(&self, name: &str) -> Option<&LayerOutput> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn item_count(&self) -> usize {
        self.layers.iter().map(|l| l.items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invisible_items_are_dropped_on_push() {
        let mut layer = LayerOutput::new("t", ZBand::Post);
        layer.push(DrawItem::solid(Shape::Rect(Rect::ZERO), Color::WHITE).with_opacity(0.0));
        layer.push(DrawItem::solid(Shape::Rect(Rect::ZERO), Color::WHITE).with_opacity(f64::NAN));
        assert!(layer.is_empty());
        layer.push(DrawItem::solid(Shape::Rect(Rect::ZERO), Color::WHITE).with_opacity(0.2));
        assert_eq!(layer.items.len(), 1);
    }

    #[test]
    fn bands_order_back_to_front() {
        assert!(ZBand::Backdrop < ZBand::Stage);
        assert!(ZBand::Stage < ZBand::Title);
        assert!(ZBand::Title < ZBand::Post);
    }
}
