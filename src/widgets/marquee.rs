use crate::foundation::error::{CyberfolioError, CyberfolioResult};
use std::{collections::BTreeMap, time::Duration};

/// Icon CDN root; icons live at `{base}/{slug}.svg`.
pub const DEVICON_BASE: &str = "https://cdn.jsdelivr.net/gh/devicons/devicon/icons";

/// Widest entry [`Marquee::render_line`] will lay out, in characters.
const MAX_CELL_CHARS: f64 = 4_096.0;

/// One marquee entry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Skill {
    pub name: String,
    /// Devicon path without extension, e.g. `rust/rust-original`.
    #[serde(default)]
    pub icon: Option<String>,
}

impl Skill {
    pub fn new(name: &str, icon: &str) -> Self {
        Self {
            name: name.to_owned(),
            icon: Some(icon.to_owned()),
        }
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon
            .as_deref()
            .map(|slug| format!("{DEVICON_BASE}/{slug}.svg"))
    }
}

/// Endlessly scrolling strip of skills.
///
/// Position is a pure function of time: the strip moves left at `speed` px/s and wraps
/// after one full track width, with a second copy filling the gap.
#[derive(Clone, Debug, PartialEq)]
pub struct Marquee {
    skills: Vec<Skill>,
    /// Pixels per second.
    pub speed: f64,
    /// Horizontal pitch of one entry, gap included.
    pub item_px: f64,
}

impl Marquee {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self {
            skills,
            speed: 60.0,
            item_px: 160.0,
        }
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    fn has_geometry(&self) -> bool {
        !self.skills.is_empty() && self.item_px.is_finite() && self.item_px > 0.0
    }

    pub fn track_px(&self) -> f64 {
        self.skills.len() as f64 * self.item_px
    }

    /// Strip offset in `(-track, 0]` at `now_ms`.
    pub fn offset_px(&self, now_ms: u64) -> f64 {
        let track = self.track_px();
        if track <= 0.0 {
            return 0.0;
        }
        let off = -(self.speed * now_ms as f64 / 1000.0).rem_euclid(track);
        if off == 0.0 { 0.0 } else { off }
    }

    /// Entries intersecting `[0, viewport_px)` with their left edge. Empty when there is
    /// nothing to lay out (no skills, or a non-positive or non-finite pitch or viewport).
    pub fn visible(&self, now_ms: u64, viewport_px: f64) -> Vec<(f64, &Skill)> {
        if !self.has_geometry() || !viewport_px.is_finite() {
            return Vec::new();
        }
        let start = self.offset_px(now_ms);
        let mut out = Vec::new();
        let mut x = start;
        let mut i = 0usize;
        while x < viewport_px {
            if x + self.item_px > 0.0 {
                out.push((x, &self.skills[i % self.skills.len()]));
            }
            x += self.item_px;
            i += 1;
        }
        out
    }

    /// One terminal line `width` characters wide; one character stands for `px_per_char`
    /// pixels. Blank when the scale leaves nothing sensible to draw.
    pub fn render_line(&self, now_ms: u64, width: usize, px_per_char: f64) -> String {
        let blank = || " ".repeat(width);
        if width == 0 || !self.has_geometry() || !px_per_char.is_finite() || px_per_char <= 0.0 {
            return blank();
        }
        let cell = (self.item_px / px_per_char).round().max(1.0);
        if cell > MAX_CELL_CHARS {
            return blank();
        }
        let cell = cell as usize;
        let ribbon: Vec<char> = self
            .skills
            .iter()
            .flat_map(|s| {
                let mut label: Vec<char> = format!(" {} ", s.name).chars().take(cell).collect();
                if label.len() < cell {
                    label.resize(cell - 1, ' ');
                    label.push('·');
                }
                label
            })
            .collect();
        let shift = ((-self.offset_px(now_ms)) / px_per_char).floor() as usize;
        (0..width)
            .map(|i| ribbon[(shift + i) % ribbon.len()])
            .collect()
    }
}

/// Fetches icon bytes by URL.
pub trait IconFetcher {
    fn fetch(&self, url: &str) -> CyberfolioResult<Vec<u8>>;
}

/// Blocking HTTP icon fetcher.
pub struct HttpIconFetcher {
    client: reqwest::blocking::Client,
}

impl HttpIconFetcher {
    pub fn new() -> CyberfolioResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CyberfolioError::fetch(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

impl IconFetcher for HttpIconFetcher {
    fn fetch(&self, url: &str) -> CyberfolioResult<Vec<u8>> {
        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::bytes)
            .map_err(|e| CyberfolioError::fetch(format!("{url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Icons that could be fetched, by skill name. Missing icons are simply absent.
#[derive(Clone, Debug, Default)]
pub struct IconSet {
    icons: BTreeMap<String, Vec<u8>>,
}

impl IconSet {
    pub fn load(skills: &[Skill], fetcher: &dyn IconFetcher) -> Self {
        let mut icons = BTreeMap::new();
        for skill in skills {
            let Some(url) = skill.icon_url() else {
                continue;
            };
            match fetcher.fetch(&url) {
                Ok(bytes) => {
                    icons.insert(skill.name.clone(), bytes);
                }
                Err(e) => tracing::debug!(skill = %skill.name, error = %e, "icon unavailable"),
            }
        }
        Self { icons }
    }

    pub fn icon(&self, name: &str) -> Option<&[u8]> {
        self.icons.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
