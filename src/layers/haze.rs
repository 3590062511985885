use crate::{
    animation::interpolate::{InterpOpts, interpolate},
    foundation::color::Color,
    layers::Layer,
    render::display::{DrawItem, GradientStop, LayerOutput, Paint, Shape, ZBand},
    scene::timeline::FrameCtx,
};

/// Deep-red radial glow behind the stage that thickens as the grid takes over.
pub struct Haze;

impl Layer for Haze {
    fn name(&self) -> &'static str {
        "haze"
    }

    fn z(&self) -> ZBand {
        ZBand::Backdrop
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let canvas = ctx.config.canvas;
        let center = canvas.center();
        let half_diag = center.to_vec2().hypot();
        let deep = ctx.config.palette.deep;

        out.opacity = interpolate(ctx.transition, &[0.0, 1.0], &[0.4, 0.8], InterpOpts::EXTEND);
        out.push(DrawItem::new(
            Shape::Rect(canvas.rect()),
            Paint::Radial {
                center,
                radius: half_diag * 0.8,
                stops: vec![
                    GradientStop::new(0.0, deep),
                    GradientStop::new(1.0, Color { a: 0, ..deep }),
                ],
            },
        ));
    }
}
