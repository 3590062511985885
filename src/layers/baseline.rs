use crate::{
    animation::interpolate::{InterpOpts, interpolate},
    foundation::{color::Color, core::Rect},
    layers::{Layer, sine_between},
    render::display::{DrawItem, GradientStop, LayerOutput, Paint, Shape, ZBand},
    scene::timeline::FrameCtx,
};

const STREAMS: usize = 10;
const BAND_CENTERS: [f64; 6] = [0.10, 0.25, 0.40, 0.55, 0.70, 0.85];
const DUST_GROUPS: usize = 15;
const DUST_PER_GROUP: usize = 20;
const LINES: usize = 120;

/// Opening look: vertical data streams, blurred bands, dust and flickering
/// lines standing upright on the stage. Fades out as the stage tilts.
pub struct VerticalBaseline;

impl Layer for VerticalBaseline {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn z(&self) -> ZBand {
        ZBand::Stage
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        out.opacity = interpolate(ctx.transition, &[0.0, 0.6], &[1.0, 0.0], InterpOpts::CLAMP);
        if out.opacity <= 0.0 {
            return;
        }

        let (w, h) = (ctx.width(), ctx.height());
        let t = ctx.t();
        let palette = &ctx.config.palette;
        let stage = &ctx.stage;
        let mut quad = |rect: Rect, paint: Paint, opacity: f64, blur: f64| {
            if let Some((poly, k)) = stage.project_rect(rect, 0.0) {
                out.push(
                    DrawItem::new(Shape::Polygon(poly), paint)
                        .with_opacity(opacity)
                        .with_blur(blur * k),
                );
            }
        };

        let stream_paint = Paint::VerticalGradient(vec![
            GradientStop::new(0.0, Color { a: 0, ..palette.primary }),
            GradientStop::new(0.5, Color { a: 0x22, ..palette.primary }),
            GradientStop::new(1.0, Color { a: 0, ..palette.primary }),
        ]);
        for i in 0..STREAMS {
            let x = i as f64 / (STREAMS - 1) as f64 * w;
            let shift = ((t * 5.0 + i as f64 * 100.0) % 200.0 - 50.0) / 100.0 * h;
            quad(
                Rect::new(x, shift, x + 1.0, shift + h),
                stream_paint.clone(),
                1.0,
                0.0,
            );
        }

        for (i, cx) in BAND_CENTERS.iter().enumerate() {
            let (cx, half) = (cx * w, 0.075 * w);
            quad(
                Rect::new(cx - half, 0.0, cx + half, h),
                Paint::Solid(palette.primary),
                sine_between(t, 25.0, i as f64, 0.1, 0.5),
                60.0,
            );
        }

        let mut rng = ctx.rng("baseline-dust");
        for g in 0..DUST_GROUPS {
            let gx = g as f64 / (DUST_GROUPS - 1) as f64 * w;
            for d in 0..DUST_PER_GROUP {
                let seed = (g * 100 + d) as f64;
                let y_pct = (seed * 13.0) % 100.0;
                let x = gx + (y_pct + t / 10.0).sin() * 10.0;
                let y = y_pct / 100.0 * h;
                let flicker = if rng.chance(ctx.config.timing.stutter.dust_dim) {
                    0.3
                } else {
                    1.0
                };
                quad(
                    Rect::new(x, y, x + 2.0, y + 2.0),
                    Paint::Solid(palette.bright),
                    flicker * 0.4,
                    0.0,
                );
            }
        }

        let mut rng = ctx.rng("baseline-lines");
        for i in 0..LINES {
            let x = i as f64 / (LINES - 1) as f64 * w;
            let height_pct = sine_between(t, 15.0, i as f64 * 14.5, 40.0, 100.0);
            let top = (100.0 - height_pct) / 2.0 / 100.0 * h;
            let rect = Rect::new(
                x,
                top,
                x + if i % 12 == 0 { 2.0 } else { 1.0 },
                top + height_pct / 100.0 * h,
            );
            let flicker = if rng.chance(ctx.config.timing.stutter.scanline_dim) {
                0.1
            } else {
                1.0
            };
            let opacity = if i % 6 == 0 { 0.6 } else { 0.05 } * flicker;
            if i % 12 == 0 {
                quad(rect.inflate(4.0, 0.0), Paint::Solid(palette.primary), opacity * 0.5, 10.0);
            }
            quad(rect, Paint::Solid(palette.primary), opacity, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{foundation::core::FrameIndex, scene::{config::IntroConfig, timeline::Timeline}};

    fn render(frame: u64) -> LayerOutput {
        let cfg = IntroConfig::default();
        let ctx = Timeline::new(&cfg).frame_ctx(FrameIndex(frame));
        let mut out = LayerOutput::new("baseline", ZBand::Stage);
        VerticalBaseline.render(&ctx, &mut out);
        out
    }

    #[test]
    fn fully_visible_before_transition() {
        let out = render(10);
        assert_eq!(out.opacity, 1.0);
        // 10 streams, 6 bands, 300 dust dots, 120 lines plus 10 glow copies.
        assert_eq!(out.items.len(), 10 + 6 + 300 + 120 + 10);
    }

    #[test]
    fn gone_once_the_grid_has_taken_over() {
        let out = render(299);
        assert!(out.is_empty());
    }
}
