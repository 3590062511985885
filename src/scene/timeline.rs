use crate::{
    animation::{
        interpolate::{InterpOpts, interpolate},
        spring::spring,
    },
    foundation::{
        core::{FrameIndex, Vec2},
        math::FrameRng,
    },
    layers::stage::Stage,
    scene::config::IntroConfig,
};

/// Per-frame values shared by all layers.
///
/// Computed once per tick by [`Timeline::frame_ctx`]; layers read it and never recompute the
/// transition spring themselves.
#[derive(Clone, Debug)]
pub struct FrameCtx<'a> {
    pub config: &'a IntroConfig,
    pub frame: FrameIndex,
    /// Vertical-to-grid transition, 0 at rest, ~1 settled.
    pub transition: f64,
    pub camera_zoom: f64,
    pub stage: Stage,
    pub crashed: bool,
    pub shake: Vec2,
    /// Horizontal offset of the chromatic fringe in pixels.
    pub chromatic: f64,
}

impl FrameCtx<'_> {
    /// Deterministic random stream for one effect on this frame.
    pub fn rng(&self, salt: &str) -> FrameRng {
        FrameRng::for_frame(self.config.seed, self.frame, salt)
    }

    /// Frame as a float for the sine-driven motion.
    pub fn t(&self) -> f64 {
        self.frame.0 as f64
    }

    pub fn width(&self) -> f64 {
        f64::from(self.config.canvas.width)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.config.canvas.height)
    }
}

/// Stateless evaluator of the intro's global curves.
#[derive(Clone, Debug)]
pub struct Timeline<'a> {
    config: &'a IntroConfig,
}

impl<'a> Timeline<'a> {
    pub fn new(config: &'a IntroConfig) -> Self {
        Self { config }
    }

    pub fn transition_progress(&self, frame: FrameIndex) -> f64 {
        let t = &self.config.timing;
        spring(
            frame.offset_from(t.transition_start),
            self.config.fps,
            t.transition_spring,
        )
    }

    pub fn camera_zoom(&self, frame: FrameIndex) -> f64 {
        interpolate(
            frame.0 as f64,
            &[0.0, self.config.duration as f64],
            &[1.0, self.config.timing.camera_zoom_end],
            InterpOpts::CLAMP,
        )
    }

    pub fn frame_ctx(&self, frame: FrameIndex) -> FrameCtx<'a> {
        let cfg = self.config;
        let transition = self.transition_progress(frame);
        let camera_zoom = self.camera_zoom(frame);
        let crashed = cfg.timing.is_crashed(frame);

        let shake = if crashed {
            let mut rng = FrameRng::for_frame(cfg.seed, frame, "shake");
            Vec2::new(
                rng.centered() * cfg.timing.shake_px,
                rng.centered() * cfg.timing.shake_px,
            )
        } else {
            Vec2::ZERO
        };

        let chromatic = interpolate(
            transition,
            &[0.0, 0.5, 1.0],
            &[0.0, 15.0, 2.0],
            InterpOpts::EXTEND,
        ) + if crashed { 20.0 } else { 0.0 };

        FrameCtx {
            config: cfg,
            frame,
            transition,
            camera_zoom,
            stage: Stage::from_progress(cfg.canvas, transition, camera_zoom),
            crashed,
            shake,
            chromatic,
        }
    }
}
