use crate::foundation::color::Color;

/// Colors shared by every intro layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    /// Main line/particle color.
    pub primary: Color,
    /// Haze color behind the stage.
    pub deep: Color,
    /// Highlight color (major grid lines, hero particles, dust).
    pub bright: Color,
    /// Canvas clear color.
    pub background: Color,
}

impl Palette {
    /// Red-on-black, the default look.
    pub const fn crimson() -> Self {
        Self {
            primary: Color::rgb(0xff, 0x00, 0x33),
            deep: Color::rgb(0x44, 0x00, 0x05),
            bright: Color::rgb(0xff, 0x33, 0x66),
            background: Color::rgb(0x02, 0x00, 0x02),
        }
    }

    /// Pink variant matching the landing page accent (`#FF2A55`).
    pub const fn phantom() -> Self {
        Self {
            primary: Color::rgb(0xff, 0x2a, 0x55),
            deep: Color::rgb(0x3a, 0x00, 0x10),
            bright: Color::rgb(0xff, 0x6b, 0x8b),
            background: Color::rgb(0x05, 0x00, 0x05),
        }
    }

    /// Look up a built-in palette by name.
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "crimson" | "red" => Some(Self::crimson()),
            "phantom" | "pink" => Some(Self::phantom()),
            _ => None,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::crimson()
    }
}
