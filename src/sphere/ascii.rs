use crate::sphere::raster::LumaBuffer;

/// Dark-to-bright ramp used by the sphere.
pub const CHARSET: &str = " .:-+*=%@#";

/// Brightness-to-glyph post-process.
#[derive(Clone, Debug, PartialEq)]
pub struct AsciiEffect {
    glyphs: Vec<char>,
    invert: bool,
    /// Cells per output pixel along each axis.
    resolution: f64,
}

impl Default for AsciiEffect {
    fn default() -> Self {
        Self::new(CHARSET, true, 0.15)
    }
}

impl AsciiEffect {
    /// An empty `charset` falls back to [`CHARSET`].
    pub fn new(charset: &str, invert: bool, resolution: f64) -> Self {
        let glyphs: Vec<char> = if charset.is_empty() {
            CHARSET.chars().collect()
        } else {
            charset.chars().collect()
        };
        Self {
            glyphs,
            invert,
            resolution,
        }
    }

    /// Character grid side length for a square viewport of `size_px` pixels.
    pub fn cells_for(&self, size_px: u32) -> u32 {
        (f64::from(size_px) * self.resolution).round().max(1.0) as u32
    }

    /// Glyph for a brightness in `[0, 1]`.
    ///
    /// The ramp index is `floor((1 - b) * (n - 1))`, mirrored when inverted, so with
    /// inversion black maps to the first glyph and full white to the last.
    pub fn glyph(&self, brightness: f64) -> char {
        let last = self.glyphs.len() - 1;
        let b = if brightness.is_finite() {
            brightness.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut idx = ((1.0 - b) * last as f64).floor() as usize;
        if self.invert {
            idx = last - idx.min(last);
        }
        self.glyphs[idx.min(last)]
    }

    pub fn convert(&self, luma: &LumaBuffer) -> Vec<String> {
        (0..luma.height)
            .map(|y| {
                (0..luma.width)
                    .map(|x| self.glyph(f64::from(luma.get(x, y))))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_ramp_maps_black_to_space_and_white_to_hash() {
        let fx = AsciiEffect::default();
        assert_eq!(fx.glyph(0.0), ' ');
        assert_eq!(fx.glyph(1.0), '#');
        // The translucent gray floor.
        assert_eq!(fx.glyph(0.16), ':');
    }

    #[test]
    fn non_inverted_ramp_runs_the_other_way() {
        let fx = AsciiEffect::new(CHARSET, false, 0.15);
        assert_eq!(fx.glyph(0.0), '#');
        assert_eq!(fx.glyph(1.0), ' ');
    }

    #[test]
    fn glyph_is_total() {
        let fx = AsciiEffect::default();
        assert_eq!(fx.glyph(f64::NAN), ' ');
        assert_eq!(fx.glyph(7.0), '#');
        assert_eq!(fx.glyph(-1.0), ' ');
    }

    #[test]
    fn resolution_sets_the_grid() {
        let fx = AsciiEffect::default();
        assert_eq!(fx.cells_for(400), 60);
        assert_eq!(fx.cells_for(1), 1);
    }

    #[test]
    fn convert_keeps_rows_and_columns() {
        let mut luma = LumaBuffer::new(3, 2);
        luma.data[2] = 1.0;
        let rows = AsciiEffect::default().convert(&luma);
        assert_eq!(rows, vec!["  #".to_owned(), "   ".to_owned()]);
    }
}
