use crate::{
    foundation::{
        color::Color,
        core::{Affine, Rect, Vec2},
    },
    layers::Layer,
    render::display::{Blend, DrawItem, LayerOutput, NoiseSpec, Shape, ZBand},
    scene::timeline::FrameCtx,
};

/// Largest seed accepted by the SVG turbulence primitive.
const TURBULENCE_SEED_MAX: u64 = i32::MAX as u64;

/// Screen-blended TV static: always during the crash, a rare stutter otherwise.
pub struct StaticOverlay;

impl Layer for StaticOverlay {
    fn name(&self) -> &'static str {
        "static"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let mut rng = ctx.rng("static");
        let stutter = rng.chance(ctx.config.timing.stutter.static_overlay);
        if !ctx.crashed && !stutter {
            return;
        }
        out.opacity = if ctx.crashed { 0.3 } else { 0.08 };
        out.blend = Blend::Screen;

        let canvas = ctx.config.canvas.rect();
        let offset = Vec2::new(rng.next_f64() * 50.0, rng.next_f64() * 50.0);
        out.push(
            DrawItem::solid(
                Shape::Noise {
                    rect: canvas.inflate(50.0, 50.0),
                    noise: NoiseSpec {
                        base_frequency: 0.8,
                        octaves: 4,
                        seed: ctx.config.seed % TURBULENCE_SEED_MAX,
                        monochrome: false,
                        contrast: 1.5,
                        brightness: 2.0,
                    },
                },
                Color::WHITE,
            )
            .with_transform(Affine::translate(offset)),
        );

        if !ctx.crashed {
            return;
        }
        let palette = &ctx.config.palette;
        let (w, h) = (ctx.width(), ctx.height());
        for i in 0..10 {
            let top = rng.next_f64() * h;
            let height = rng.next_f64() * 50.0;
            let dx = rng.centered() * 100.0;
            let color = if i % 2 == 0 { palette.bright } else { palette.primary };
            out.push(
                DrawItem::solid(Shape::Rect(Rect::new(0.0, top, w, top + height)), color)
                    .with_opacity(0.4)
                    .with_transform(Affine::translate((dx, 0.0))),
            );
        }
    }
}

/// Red ghosting, signal-loss bars and horizontal tearing.
pub struct GlitchBurst;

impl Layer for GlitchBurst {
    fn name(&self) -> &'static str {
        "glitch"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let mut rng = ctx.rng("glitch");
        let burst = rng.chance(ctx.config.timing.stutter.glitch_burst);
        if !ctx.crashed && !burst {
            return;
        }
        let primary = ctx.config.palette.primary;
        let (w, h) = (ctx.width(), ctx.height());

        out.push(
            DrawItem::solid(Shape::Rect(ctx.config.canvas.rect()), primary)
                .with_opacity(0.3)
                .with_blend(Blend::Difference)
                .with_transform(Affine::translate((rng.next_f64() * 20.0, 0.0))),
        );

        if ctx.crashed {
            for _ in 0..5 {
                let top = rng.next_f64() * h;
                let height = rng.next_f64() * 100.0;
                out.push(DrawItem::solid(
                    Shape::Rect(Rect::new(0.0, top, w, top + height)),
                    Color::BLACK,
                ));
            }
        }

        for _ in 0..5 {
            let top = rng.next_f64() * h;
            let height = rng.next_f64() * 0.15 * h;
            let dx = rng.centered() * 200.0;
            out.push(
                DrawItem::solid(Shape::Rect(Rect::new(0.0, top, w, top + height)), primary)
                    .with_opacity(0.4)
                    .with_blend(Blend::Overlay)
                    .with_transform(Affine::translate((dx, 0.0))),
            );
        }
    }
}

/// Per-frame film grain.
pub struct Grain;

impl Layer for Grain {
    fn name(&self) -> &'static str {
        "grain"
    }

    fn z(&self) -> ZBand {
        ZBand::Post
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        out.opacity = 0.1;
        out.push(DrawItem::solid(
            Shape::Noise {
                rect: ctx.config.canvas.rect(),
                noise: NoiseSpec {
                    base_frequency: 0.65,
                    octaves: 3,
                    seed: ctx.frame.0 % TURBULENCE_SEED_MAX,
                    monochrome: true,
                    contrast: 1.0,
                    brightness: 1.0,
                },
            },
            Color::WHITE,
        ));
    }
}
