use std::{path::Path, sync::Arc};

use crate::{
    foundation::error::{CyberfolioError, CyberfolioResult},
    render::frame::FrameRGBA,
};

/// Avoid pathological allocations from a bad canvas size.
const MAX_DIM: u32 = 16_384;

/// SVG-to-pixels backend built on `usvg`/`resvg`.
///
/// The font database is built once; rasterizing many frames reuses it.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    /// System fonts plus any `.ttf`/`.otf`/`.ttc` files under `font_dirs` and `font_files`.
    pub fn new(font_dirs: &[&Path], font_files: &[&Path]) -> CyberfolioResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        for file in font_files {
            db.load_font_file(file).map_err(|e| {
                CyberfolioError::render(format!("load font '{}': {e}", file.display()))
            })?;
        }
        tracing::debug!(faces = db.len(), "font database ready");

        Ok(Self {
            options: usvg::Options {
                fontdb: Arc::new(db),
                font_resolver: make_font_resolver(),
                ..Default::default()
            },
        })
    }

    /// Parse and rasterize `svg` at its own size into premultiplied RGBA8.
    pub fn rasterize(&self, svg: &str) -> CyberfolioResult<FrameRGBA> {
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| CyberfolioError::render(format!("parse svg: {e}")))?;

        let size = tree.size();
        let (w, h) = (to_px(size.width())?, to_px(size.height())?);
        if w > MAX_DIM || h > MAX_DIM {
            return Err(CyberfolioError::render(format!(
                "raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| CyberfolioError::render("failed to allocate pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(FrameRGBA {
            width: w,
            height: h,
            data: pixmap.take(),
            premultiplied: true,
        })
    }
}

fn to_px(v: f32) -> CyberfolioResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(CyberfolioError::render("svg has invalid width/height"));
    }
    Ok((v.ceil() as u32).max(1))
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Resolve the requested families first, then fall back to any generic face so the title
/// always renders, even on a machine without the display font.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizes_a_solid_rect() {
        let r = SvgRasterizer::new(&[], &[]).unwrap();
        let frame = r
            .rasterize(
                r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"><rect width="4" height="2" fill="#ff0033"/></svg>"##,
            )
            .unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(&frame.data[..4], &[0xff, 0x00, 0x33, 0xff]);
    }

    #[test]
    fn malformed_svg_is_a_render_error() {
        let r = SvgRasterizer::new(&[], &[]).unwrap();
        let err = r.rasterize("<svg").unwrap_err();
        assert!(matches!(err, CyberfolioError::Render(_)));
    }

    #[test]
    fn missing_font_file_is_reported() {
        let err = SvgRasterizer::new(&[], &[Path::new("/definitely/not/here.ttf")]);
        assert!(err.is_err());
    }
}
