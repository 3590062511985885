use crate::{
    animation::clock::AnimationClock,
    foundation::core::FrameIndex,
    layers::LayerStack,
    render::display::Scene,
    scene::{config::IntroConfig, timeline::Timeline},
};

/// The intro while it is on screen.
///
/// Sole writer of the [`AnimationClock`]. Layers read the frame through the per-tick
/// [`FrameCtx`](crate::scene::timeline::FrameCtx) built in [`IntroSurface::scene`]. The page
/// drops the surface on skip or completion, which also stops the clock.
pub struct IntroSurface {
    config: IntroConfig,
    stack: LayerStack,
    clock: AnimationClock,
    started_ms: u64,
    emits_completion: bool,
}

impl IntroSurface {
    /// `emits_completion = false` models a player whose end-of-playback callback never
    /// arrives; the page then relies on its fallback timer alone.
    pub fn new(config: IntroConfig, started_ms: u64, emits_completion: bool) -> Self {
        let clock = AnimationClock::new(config.fps);
        Self {
            config,
            stack: LayerStack::standard(),
            clock,
            started_ms,
            emits_completion,
        }
    }

    pub fn frame(&self) -> FrameIndex {
        self.clock.frame()
    }

    pub fn config(&self) -> &IntroConfig {
        &self.config
    }

    /// Tick the clock up to the wall time `now_ms`, never past the last frame.
    /// Returns the number of ticks taken.
    pub fn tick_to(&mut self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        let last = self.config.duration.saturating_sub(1);
        let room = last.saturating_sub(self.clock.frame().0);
        let due = self.clock.frames_due(elapsed).min(room);
        for _ in 0..due {
            self.clock.tick();
        }
        due
    }

    /// Wall time at which playback ends and the completion callback fires, if it fires.
    pub fn completion_due_ms(&self) -> Option<u64> {
        self.emits_completion.then(|| {
            self.started_ms
                .saturating_add(self.config.fps.frames_to_millis(self.config.duration))
        })
    }

    /// Display list of the current frame.
    pub fn scene(&self) -> Scene {
        let ctx = Timeline::new(&self.config).frame_ctx(self.clock.frame());
        self.stack.render(&ctx)
    }
}

impl Drop for IntroSurface {
    fn drop(&mut self) {
        tracing::debug!(frame = self.clock.frame().0, "intro surface dropped");
    }
}
