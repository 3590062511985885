use crate::{
    animation::interpolate::{InterpOpts, interpolate},
    foundation::core::Rect,
    layers::Layer,
    render::display::{DrawItem, LayerOutput, Paint, Shape, ZBand},
    scene::timeline::FrameCtx,
};

const ROWS: usize = 100;
const COLUMNS: usize = 60;
const BLOCKS: usize = 10;

/// Floor and ceiling grids that fade in once the stage has tilted.
pub struct DetailedGrid;

#[derive(Clone, Copy)]
enum Side {
    Ceiling,
    Floor,
}

impl Side {
    /// Map a local y on this side's sheet to stage y. The ceiling sheet is flipped.
    fn stage_y(self, local: f64, h: f64) -> f64 {
        match self {
            Self::Floor => local + 0.25 * h,
            Self::Ceiling => (h - local) - 0.25 * h,
        }
    }

    fn stage_rect(self, x0: f64, y0: f64, x1: f64, y1: f64, h: f64) -> Rect {
        let (a, b) = (self.stage_y(y0, h), self.stage_y(y1, h));
        Rect::new(x0, a.min(b), x1, a.max(b))
    }
}

/// Whether glitch block `i` shows on this frame. Later blocks appear later in each
/// 30-frame cycle.
pub(crate) fn block_visible(frame: u64, i: usize) -> bool {
    frame % 30 >= (i as u64) * 2
}

impl Layer for DetailedGrid {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn z(&self) -> ZBand {
        ZBand::Stage
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        out.opacity = interpolate(ctx.transition, &[0.2, 0.8], &[0.0, 1.0], InterpOpts::CLAMP);
        if out.opacity <= 0.0 {
            return;
        }

        let (w, h) = (ctx.width(), ctx.height());
        let palette = &ctx.config.palette;
        let stage = &ctx.stage;

        for side in [Side::Ceiling, Side::Floor] {
            let mut quad = |rect: Rect, paint: Paint, opacity: f64, glow: bool| {
                if let Some((poly, k)) = stage.project_rect(rect, 0.0) {
                    if glow {
                        out.push(
                            DrawItem::new(Shape::Polygon(poly.clone()), paint.clone())
                                .with_opacity(opacity * 0.5)
                                .with_blur(6.0 * k),
                        );
                    }
                    out.push(DrawItem::new(Shape::Polygon(poly), paint).with_opacity(opacity));
                }
            };

            for i in 0..ROWS {
                let y = i as f64 / (ROWS - 1) as f64 * h;
                let major = i % 10 == 0;
                let color = if major { palette.bright } else { palette.primary };
                let opacity =
                    interpolate(i as f64, &[0.0, ROWS as f64], &[1.0, 0.0], InterpOpts::CLAMP);
                quad(side.stage_rect(0.0, y, w, y + 1.0, h), Paint::Solid(color), opacity, major);
            }

            for i in 0..COLUMNS {
                let x = i as f64 / (COLUMNS - 1) as f64 * w;
                quad(
                    side.stage_rect(x, 0.0, x + 1.0, h, h),
                    Paint::Solid(palette.primary),
                    0.15,
                    false,
                );
            }

            for i in 0..BLOCKS {
                if !block_visible(ctx.frame.0, i) {
                    continue;
                }
                let seed = i as f64 * 22.3;
                let top = (seed % 90.0) / 100.0 * h;
                let left = ((seed * 7.0) % 50.0) / 100.0 * w;
                let width = (10.0 + seed % 30.0) / 100.0 * w;
                quad(
                    side.stage_rect(left, top, left + width, top + 2.0, h),
                    Paint::Solid(palette.bright),
                    0.4,
                    true,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{foundation::core::FrameIndex, scene::{config::IntroConfig, timeline::Timeline}};

    #[test]
    fn hidden_until_transition_is_underway() {
        let cfg = IntroConfig::default();
        let tl = Timeline::new(&cfg);
        let mut out = LayerOutput::new("grid", ZBand::Stage);
        DetailedGrid.render(&tl.frame_ctx(FrameIndex(40)), &mut out);
        assert!(out.is_empty());

        let mut out = LayerOutput::new("grid", ZBand::Stage);
        DetailedGrid.render(&tl.frame_ctx(FrameIndex(280)), &mut out);
        assert!(out.opacity > 0.9);
        assert!(!out.items.is_empty());
    }

    #[test]
    fn block_cycle() {
        assert!(block_visible(0, 0));
        assert!(!block_visible(0, 1));
        assert!(block_visible(2, 1));
        assert!(!block_visible(17, 9));
        assert!(block_visible(18, 9));
        assert!(!block_visible(30, 9));
    }

    #[test]
    fn ceiling_is_mirrored() {
        let h = 1080.0;
        assert_eq!(Side::Floor.stage_y(0.0, h), 270.0);
        assert_eq!(Side::Ceiling.stage_y(0.0, h), 810.0);
        assert_eq!(Side::Ceiling.stage_y(h, h), -270.0);
    }
}
