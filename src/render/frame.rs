use crate::foundation::error::{CyberfolioError, CyberfolioResult};

/// Final rendered frame in CPU memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Copy with straight (non-premultiplied) alpha, as expected by PNG encoders.
    pub fn to_straight(&self) -> FrameRGBA {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }

    /// Write the frame as a PNG file.
    pub fn save_png(&self, path: &std::path::Path) -> CyberfolioResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let straight = self.to_straight();
        let img = image::RgbaImage::from_raw(self.width, self.height, straight.data)
            .ok_or_else(|| CyberfolioError::encode("frame buffer does not match its size"))?;
        img.save(path).map_err(|e| {
            CyberfolioError::encode(format!("write png '{}': {e}", path.display()))
        })
    }

    /// Average color over all pixels, useful as a cheap fingerprint.
    pub fn mean_rgb(&self) -> [f64; 3] {
        let n = (self.data.len() / 4).max(1) as f64;
        let mut sum = [0.0; 3];
        for px in self.data.chunks_exact(4) {
            for (s, c) in sum.iter_mut().zip(px) {
                *s += f64::from(*c);
            }
        }
        sum.map(|s| s / n)
    }
}
