use crate::{
    animation::spring::SpringConfig,
    foundation::{
        core::{FrameIndex, FrameRange},
        error::{CyberfolioError, CyberfolioResult},
    },
};

/// Frame offsets and spring parameters of the intro timeline.
///
/// All earlier revisions of the intro differ only in these numbers, so they live in one
/// table instead of parallel components.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IntroTiming {
    /// Frame at which the vertical-to-grid transition spring starts.
    pub transition_start: u64,
    pub transition_spring: SpringConfig,
    /// Camera zoom reached at the last frame (starts at 1.0).
    pub camera_zoom_end: f64,
    /// Hard "crash" window: full shake, static and glitch.
    pub crash: FrameRange,
    /// Peak-to-peak screen shake in pixels during the crash.
    pub shake_px: f64,
    pub title_reveal_start: u64,
    pub title_reveal_spring: SpringConfig,
    pub title_exit_start: u64,
    pub title_exit_spring: SpringConfig,
    pub stutter: StutterRates,
}

/// Per-frame probabilities of the random flourishes outside the crash window.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StutterRates {
    pub static_overlay: f64,
    pub glitch_burst: f64,
    pub title_flicker: f64,
    pub dust_dim: f64,
    pub scanline_dim: f64,
}

impl Default for StutterRates {
    fn default() -> Self {
        Self {
            static_overlay: 0.05,
            glitch_burst: 0.02,
            title_flicker: 0.04,
            dust_dim: 0.2,
            scanline_dim: 0.05,
        }
    }
}

impl Default for IntroTiming {
    fn default() -> Self {
        Self {
            transition_start: 45,
            transition_spring: SpringConfig::new(100.0, 40.0, 1.0),
            camera_zoom_end: 1.3,
            crash: FrameRange {
                start: FrameIndex(51),
                end: FrameIndex(65),
            },
            shake_px: 50.0,
            title_reveal_start: 180,
            title_reveal_spring: SpringConfig::new(15.0, 10.0, 1.0),
            title_exit_start: 230,
            title_exit_spring: SpringConfig::new(60.0, 12.0, 3.0),
            stutter: StutterRates::default(),
        }
    }
}

impl IntroTiming {
    pub fn validate(&self) -> CyberfolioResult<()> {
        self.transition_spring.validate()?;
        self.title_reveal_spring.validate()?;
        self.title_exit_spring.validate()?;
        for (name, start) in [
            ("transition_start", self.transition_start),
            ("title_reveal_start", self.title_reveal_start),
            ("title_exit_start", self.title_exit_start),
        ] {
            if i64::try_from(start).is_err() {
                return Err(CyberfolioError::validation(format!(
                    "{name} must be <= {}",
                    i64::MAX
                )));
            }
        }
        if self.crash.start.0 > self.crash.end.0 {
            return Err(CyberfolioError::validation(
                "crash window start must be <= end",
            ));
        }
        if self.title_exit_start < self.title_reveal_start {
            return Err(CyberfolioError::validation(
                "title exit must not start before the reveal",
            ));
        }
        if !self.camera_zoom_end.is_finite() || self.camera_zoom_end <= 0.0 {
            return Err(CyberfolioError::validation(
                "camera_zoom_end must be finite and > 0",
            ));
        }
        if !self.shake_px.is_finite() || self.shake_px < 0.0 {
            return Err(CyberfolioError::validation(
                "shake_px must be finite and >= 0",
            ));
        }
        let s = self.stutter;
        for (name, p) in [
            ("static_overlay", s.static_overlay),
            ("glitch_burst", s.glitch_burst),
            ("title_flicker", s.title_flicker),
            ("dust_dim", s.dust_dim),
            ("scanline_dim", s.scanline_dim),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CyberfolioError::validation(format!(
                    "stutter.{name} must be a probability in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// `true` inside the crash window. A hard predicate, never a ramp.
    pub fn is_crashed(&self, frame: FrameIndex) -> bool {
        self.crash.contains(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crash_window_matches_exclusive_bounds() {
        let t = IntroTiming::default();
        assert!(!t.is_crashed(FrameIndex(50)));
        assert!(t.is_crashed(FrameIndex(51)));
        assert!(t.is_crashed(FrameIndex(64)));
        assert!(!t.is_crashed(FrameIndex(65)));
    }

    #[test]
    fn defaults_validate() {
        IntroTiming::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_exit_before_reveal() {
        let t = IntroTiming {
            title_exit_start: 100,
            ..IntroTiming::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn validate_rejects_start_frames_past_i64() {
        let t = IntroTiming {
            transition_start: 1 << 63,
            ..IntroTiming::default()
        };
        assert!(matches!(t.validate(), Err(CyberfolioError::Validation(_))));
        let t = IntroTiming {
            title_reveal_start: u64::MAX,
            title_exit_start: u64::MAX,
            ..IntroTiming::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let t: IntroTiming = serde_json::from_str(r#"{"title_exit_start": 290}"#).unwrap();
        assert_eq!(t.title_exit_start, 290);
        assert_eq!(t.title_reveal_start, 180);
        assert_eq!(t.stutter, StutterRates::default());
    }
}
