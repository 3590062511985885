use crate::foundation::core::{Fps, FrameIndex};

/// Fixed-rate frame counter driving the intro.
///
/// One writer (the playback surface) calls [`AnimationClock::tick`]; readers only ever see
/// a copied [`FrameIndex`]. The clock never stops on its own: frames past the nominal
/// duration are valid and every consumer extrapolates.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    frame: FrameIndex,
    fps: Fps,
}

impl AnimationClock {
    pub fn new(fps: Fps) -> Self {
        Self {
            frame: FrameIndex(0),
            fps,
        }
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Advance by exactly one frame and return the new index.
    pub fn tick(&mut self) -> FrameIndex {
        self.frame = FrameIndex(self.frame.0.saturating_add(1));
        self.frame
    }

    /// Jump to `frame`. Frame evaluation is stateless, so a seek followed by rendering
    /// reproduces the frame exactly.
    pub fn seek(&mut self, frame: FrameIndex) {
        self.frame = frame;
    }

    /// Number of ticks owed after `elapsed_ms` of wall-clock playback.
    pub fn frames_due(&self, elapsed_ms: u64) -> u64 {
        self.fps
            .millis_to_frames_floor(elapsed_ms)
            .saturating_sub(self.frame.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_by_one() {
        let mut clock = AnimationClock::new(Fps::SIXTY);
        assert_eq!(clock.frame(), FrameIndex(0));
        assert_eq!(clock.tick(), FrameIndex(1));
        assert_eq!(clock.tick(), FrameIndex(2));
    }

    #[test]
    fn frames_due_tracks_wall_clock() {
        let mut clock = AnimationClock::new(Fps::SIXTY);
        assert_eq!(clock.frames_due(500), 30);
        for _ in 0..30 {
            clock.tick();
        }
        assert_eq!(clock.frames_due(500), 0);
        assert_eq!(clock.frames_due(1000), 30);
    }

    #[test]
    fn seek_is_absolute() {
        let mut clock = AnimationClock::new(Fps::SIXTY);
        clock.seek(FrameIndex(400));
        assert_eq!(clock.tick(), FrameIndex(401));
    }
}
