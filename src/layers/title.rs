use crate::{
    animation::{
        ease::Ease,
        interpolate::{InterpOpts, interpolate},
        spring::spring,
    },
    foundation::core::{Affine, FrameIndex, Point, Vec2},
    layers::Layer,
    render::display::{Blend, DrawItem, LayerOutput, Shape, TextRun, ZBand},
    scene::{config::IntroConfig, timeline::FrameCtx},
};

/// Perspective distance used to turn the exit's depth travel into extra scale.
const DEPTH_PERSPECTIVE: f64 = 2000.0;
/// Depth travel is capped so the projected scale stays finite.
const MAX_DEPTH_FRACTION: f64 = 0.75;
/// Below this the title cannot change a single 8-bit pixel.
const MIN_VISIBLE_OPACITY: f64 = 1.0 / 512.0;
const GHOST_OFFSETS: [f64; 2] = [0.15, 0.3];

/// Title animation values for one frame (without the random flicker).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleState {
    /// Reveal spring progress.
    pub reveal: f64,
    /// Exit (fly-through) spring progress.
    pub exit: f64,
    pub letter_spacing: f64,
    /// Reveal opacity times exit fade.
    pub opacity: f64,
    /// Exit fade alone, also used by the ghost trails.
    pub exit_fade: f64,
    pub scale: f64,
    pub depth: f64,
    pub blur: f64,
}

impl TitleState {
    /// `None` before the reveal starts: nothing is drawn.
    pub fn at(cfg: &IntroConfig, frame: FrameIndex) -> Option<Self> {
        let t = &cfg.timing;
        if frame.0 < t.title_reveal_start {
            return None;
        }
        let reveal = spring(
            frame.offset_from(t.title_reveal_start),
            cfg.fps,
            t.title_reveal_spring,
        );
        let exit = spring(
            frame.offset_from(t.title_exit_start),
            cfg.fps,
            t.title_exit_spring,
        );

        let spacing = interpolate(reveal, &[0.0, 1.0], &[-10.0, 15.0], InterpOpts::EXTEND);
        let reveal_opacity = interpolate(
            reveal,
            &[0.0, 0.4, 1.0],
            &[0.0, 0.9, 0.8],
            InterpOpts::EXTEND,
        );
        let exit_fade = interpolate(
            exit,
            &[0.4, 0.9],
            &[1.0, 0.0],
            InterpOpts::CLAMP.eased(Ease::OutCubic),
        );
        let accel = InterpOpts::EXTEND.eased(Ease::InCubic);

        Some(Self {
            reveal,
            exit,
            letter_spacing: interpolate(exit, &[0.0, 1.0], &[spacing, spacing * 12.0], InterpOpts::EXTEND),
            opacity: (reveal_opacity * exit_fade).max(0.0),
            exit_fade,
            scale: interpolate(exit, &[0.0, 1.0], &[1.0, 20.0], accel),
            depth: interpolate(exit, &[0.0, 1.0], &[0.0, 3000.0], accel),
            blur: interpolate(exit, &[0.0, 0.7, 1.0], &[0.0, 1.0, 40.0], InterpOpts::EXTEND),
        })
    }

    /// Scale after projecting `depth` toward the viewer.
    pub fn projected_scale(&self, scale: f64, depth: f64) -> f64 {
        let z = depth.clamp(0.0, DEPTH_PERSPECTIVE * MAX_DEPTH_FRACTION);
        scale.max(0.0) * DEPTH_PERSPECTIVE / (DEPTH_PERSPECTIVE - z)
    }
}

/// The name, revealed late in the intro and then flown through the camera.
pub struct TitleReveal;

impl TitleReveal {
    fn transform(ctx: &FrameCtx<'_>, shift: f64, scale: f64) -> Affine {
        let skew = ctx.config.title.skew_deg.to_radians().tan();
        let center = ctx.config.canvas.center().to_vec2() + Vec2::new(shift, 0.0);
        Affine::translate(center) * Affine::scale(scale) * Affine::skew(skew, 0.0)
    }
}

impl Layer for TitleReveal {
    fn name(&self) -> &'static str {
        "title"
    }

    fn z(&self) -> ZBand {
        ZBand::Title
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        let Some(state) = TitleState::at(ctx.config, ctx.frame) else {
            return;
        };
        let title = &ctx.config.title;
        let color = ctx.config.palette.primary;

        let mut rng = ctx.rng("title");
        let (flicker, shift) = if rng.chance(ctx.config.timing.stutter.title_flicker) {
            (0.3, rng.centered() * 10.0)
        } else {
            (1.0, 0.0)
        };

        let run = |text: String, glow: f64| TextRun {
            text,
            center: Point::ZERO,
            font_family: title.font_family.clone(),
            font_size: title.font_size,
            letter_spacing: state.letter_spacing,
            glow,
        };

        if state.exit > 0.1 {
            for offset in GHOST_OFFSETS {
                let opacity = state.exit_fade * 0.15;
                if opacity < MIN_VISIBLE_OPACITY {
                    continue;
                }
                let scale =
                    state.projected_scale(state.scale - offset, state.depth - offset * 400.0);
                out.push(
                    DrawItem::solid(Shape::Text(run(title.text.clone(), 0.0)), color)
                        .with_opacity(opacity)
                        .with_blur(state.blur + 5.0)
                        .with_transform(Self::transform(ctx, 0.0, scale)),
                );
            }
        }

        let opacity = state.opacity * flicker;
        if opacity < MIN_VISIBLE_OPACITY {
            return;
        }
        let scale = state.projected_scale(state.scale, state.depth);
        out.push(
            DrawItem::solid(Shape::Text(run(title.text.to_uppercase(), 20.0)), color)
                .with_opacity(opacity)
                .with_blur(state.blur)
                .with_blend(Blend::Screen)
                .with_transform(Self::transform(ctx, shift, scale)),
        );
    }
}
