use crate::{
    foundation::color::Color,
    layers::Layer,
    render::display::{DrawItem, GradientStop, LayerOutput, Paint, Shape, ZBand},
    scene::timeline::FrameCtx,
};

/// Dark horizontal line every 3 px.
pub struct Scanlines;

impl Layer for Scanlines {
    fn name(&self) -> &'static str {
        "scanlines"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        out.push(
            DrawItem::solid(
                Shape::Stripes {
                    rect: ctx.config.canvas.rect(),
                    period: 3.0,
                    thickness: 1.0,
                },
                Color::BLACK,
            )
            .with_opacity(0.4),
        );
    }
}

/// Inner shadow of a CRT tube: a deep black rim plus a faint red one.
pub struct CrtBezel;

impl Layer for CrtBezel {
    fn name(&self) -> &'static str {
        "bezel"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let rect = ctx.config.canvas.rect();
        out.push(DrawItem::solid(
            Shape::InsetShadow { rect, spread: 150.0 },
            Color::BLACK,
        ));
        out.push(
            DrawItem::solid(
                Shape::InsetShadow { rect, spread: 50.0 },
                Color::rgb(0xff, 0x00, 0x32),
            )
            .with_opacity(0.1),
        );
    }
}

/// Radial darkening toward the corners.
pub struct Vignette;

impl Layer for Vignette {
    fn name(&self) -> &'static str {
        "vignette"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let canvas = ctx.config.canvas;
        let center = canvas.center();
        // Transparent until 30% of the corner distance, black at 140%.
        let radius = center.to_vec2().hypot() * 1.4;
        out.push(DrawItem::new(
            Shape::Rect(canvas.rect()),
            Paint::Radial {
                center,
                radius,
                stops: vec![
                    GradientStop::new(0.3 / 1.4, Color::rgba(0, 0, 0, 0)),
                    GradientStop::new(1.0, Color::BLACK),
                ],
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::FrameIndex,
        scene::{config::IntroConfig, timeline::Timeline},
    };

    #[test]
    fn overlays_are_static_across_frames() {
        let cfg = IntroConfig::default();
        let tl = Timeline::new(&cfg);
        let layers: [&dyn Layer; 3] = [&Scanlines, &CrtBezel, &Vignette];
        for layer in layers {
            let mut a = LayerOutput::new(layer.name(), layer.z());
            layer.render(&tl.frame_ctx(FrameIndex(3)), &mut a);
            let mut b = LayerOutput::new(layer.name(), layer.z());
            layer.render(&tl.frame_ctx(FrameIndex(250)), &mut b);
            assert_eq!(a, b);
            assert!(!a.is_empty());
        }
    }
}
