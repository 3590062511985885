use crate::foundation::error::{CyberfolioError, CyberfolioResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index on the intro timeline.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Signed distance from `start` to this frame (negative before `start`), saturating at
    /// the `i64` bounds.
    pub fn offset_from(self, start: u64) -> i64 {
        let d = i128::from(self.0) - i128::from(start);
        i64::try_from(d).unwrap_or(if d < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> CyberfolioResult<Self> {
        if start.0 > end.0 {
            return Err(CyberfolioError::validation(
                "FrameRange start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// The intro's fixed tick rate.
    pub const SIXTY: Fps = Fps { num: 60, den: 1 };

    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> CyberfolioResult<Self> {
        if den == 0 {
            return Err(CyberfolioError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(CyberfolioError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert a (possibly negative) frame offset to seconds.
    pub fn frames_to_secs(self, frames: f64) -> f64 {
        frames * self.frame_duration_secs()
    }

    /// Convert elapsed milliseconds to a whole frame count (floor).
    pub fn millis_to_frames_floor(self, millis: u64) -> u64 {
        ((millis as f64 / 1000.0) * self.as_f64()).floor().max(0.0) as u64
    }

    /// Convert a frame count to whole milliseconds (rounded).
    pub fn frames_to_millis(self, frames: u64) -> u64 {
        (self.frames_to_secs(frames as f64) * 1000.0).round() as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::SIXTY
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas center in pixel space.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Full-canvas rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_is_half_open() {
        let r = FrameRange::new(FrameIndex(51), FrameIndex(65)).unwrap();
        assert!(!r.contains(FrameIndex(50)));
        assert!(r.contains(FrameIndex(51)));
        assert!(r.contains(FrameIndex(64)));
        assert!(!r.contains(FrameIndex(65)));
        assert_eq!(r.len_frames(), 14);
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(FrameRange::new(FrameIndex(3), FrameIndex(2)).is_err());
    }

    #[test]
    fn fps_conversions() {
        let fps = Fps::SIXTY;
        assert_eq!(fps.millis_to_frames_floor(1000), 60);
        assert_eq!(fps.millis_to_frames_floor(16), 0);
        assert_eq!(fps.millis_to_frames_floor(17), 1);
        assert_eq!(fps.frames_to_millis(300), 5000);
        assert!((fps.frames_to_secs(-30.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn fps_rejects_zero() {
        assert!(Fps::new(0, 1).is_err());
        assert!(Fps::new(60, 0).is_err());
    }

    #[test]
    fn frame_offset_is_signed() {
        assert_eq!(FrameIndex(179).offset_from(180), -1);
        assert_eq!(FrameIndex(200).offset_from(180), 20);
        assert_eq!(FrameIndex(10).offset_from(u64::MAX), i64::MIN);
        assert_eq!(FrameIndex(u64::MAX).offset_from(0), i64::MAX);
    }
}
