use crate::{
    foundation::{
        core::{Canvas, Fps},
        error::{CyberfolioError, CyberfolioResult},
    },
    scene::{palette::Palette, timing::IntroTiming},
};
use std::path::Path;

/// Headline text drawn by the title layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub text: String,
    /// CSS-style family list, passed through to the SVG `font-family` attribute.
    pub font_family: String,
    pub font_size: f64,
    /// Horizontal skew in degrees (negative leans right).
    pub skew_deg: f64,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            text: "Ritam Roa".to_owned(),
            font_family: "Ryzes, Orbitron, sans-serif".to_owned(),
            font_size: 160.0,
            skew_deg: -15.0,
        }
    }
}

/// Everything needed to render the intro deterministically.
///
/// The same config, seed and frame index always produce the same picture.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// Nominal length in frames. Frames past it are still valid.
    pub duration: u64,
    /// Seed for every random flourish (shake, stutter, dust).
    pub seed: u64,
    pub palette: Palette,
    pub timing: IntroTiming,
    pub title: TitleConfig,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::SIXTY,
            duration: 300,
            seed: 0x5eed_2077,
            palette: Palette::default(),
            timing: IntroTiming::default(),
            title: TitleConfig::default(),
        }
    }
}

impl IntroConfig {
    pub fn validate(&self) -> CyberfolioResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CyberfolioError::validation(
                "canvas width/height must be > 0",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(CyberfolioError::validation("fps must be non-zero"));
        }
        if self.duration == 0 {
            return Err(CyberfolioError::validation("duration must be > 0"));
        }
        if !self.title.font_size.is_finite() || self.title.font_size <= 0.0 {
            return Err(CyberfolioError::validation(
                "title font_size must be finite and > 0",
            ));
        }
        if !self.title.skew_deg.is_finite() || self.title.skew_deg.abs() >= 89.0 {
            return Err(CyberfolioError::validation(
                "title skew_deg must be within (-89, 89)",
            ));
        }
        self.timing.validate()
    }

    /// Parse and validate a JSON config. Missing fields fall back to defaults.
    pub fn from_reader(reader: impl std::io::Read) -> CyberfolioResult<Self> {
        let cfg: Self = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> CyberfolioResult<Self> {
        use anyhow::Context as _;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open intro config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default_intro() {
        let cfg = IntroConfig::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(cfg, IntroConfig::default());
        assert_eq!(cfg.duration, 300);
        assert_eq!(cfg.canvas.width, 1920);
    }

    #[test]
    fn palette_and_title_override() {
        let json = r##"{
            "seed": 7,
            "palette": {"primary":"#FF2A55","deep":"#3a0010","bright":"#ff6b8b","background":"#050005"},
            "title": {"text": "Someone Else"}
        }"##;
        let cfg = IntroConfig::from_reader(json.as_bytes()).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.palette, Palette::phantom());
        assert_eq!(cfg.title.text, "Someone Else");
        assert_eq!(cfg.title.font_size, 160.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = IntroConfig::from_reader(r#"{"duration":0}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("duration"));

        let err = IntroConfig::from_reader(r#"{"fps":{"num":60,"den":0}}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("fps"));

        let err = IntroConfig::from_reader("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, CyberfolioError::Serde(_)));
    }
}
