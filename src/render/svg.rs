//! Display list to SVG document.
//!
//! The output only uses features `usvg` understands: gradients, patterns, Gaussian blur,
//! turbulence, drop shadows and `mix-blend-mode`.

use std::fmt::Write as _;

use crate::{
    foundation::{
        color::Color,
        core::{Affine, Rect},
    },
    render::display::{
        Blend, DrawItem, GradientStop, LayerOutput, NoiseSpec, Paint, Scene, Shape, TextRun, ZBand,
    },
};

/// Serialize a scene into a standalone SVG document.
#[tracing::instrument(skip_all, fields(frame = scene.frame.0, items = scene.item_count()))]
pub fn scene_to_svg(scene: &Scene) -> String {
    let mut w = SvgWriter::default();
    let (cw, ch) = (f64::from(scene.canvas.width), f64::from(scene.canvas.height));

    w.body.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="{}"/>"#,
        num(cw),
        num(ch),
        scene.background.to_hex_rgb()
    ));
    w.body.push_str(&format!(
        r#"<g transform="translate({} {})">"#,
        num(scene.shake.x),
        num(scene.shake.y)
    ));

    let mut in_stage = false;
    for layer in &scene.layers {
        let stage = layer.band == ZBand::Stage;
        if stage && !in_stage {
            match w.chromatic_filter(scene.chromatic, scene.canvas.rect()) {
                Some(id) => w.body.push_str(&format!(r#"<g filter="url(#{id})">"#)),
                None => w.body.push_str("<g>"),
            }
        } else if !stage && in_stage {
            w.body.push_str("</g>");
        }
        in_stage = stage;
        w.layer(layer);
    }
    if in_stage {
        w.body.push_str("</g>");
    }
    w.body.push_str("</g>");

    let mut out = String::with_capacity(w.defs.len() + w.body.len() + 256);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{cw}" height="{ch}" viewBox="0 0 {cw} {ch}">"#,
        cw = num(cw),
        ch = num(ch),
    );
    if !w.defs.is_empty() {
        out.push_str("<defs>");
        out.push_str(&w.defs);
        out.push_str("</defs>");
    }
    out.push_str(&w.body);
    out.push_str("</svg>");
    out
}

#[derive(Default)]
struct SvgWriter {
    defs: String,
    body: String,
    next_id: u32,
}

impl SvgWriter {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn layer(&mut self, layer: &LayerOutput) {
        let _ = write!(
            self.body,
            r#"<g data-layer="{}" opacity="{}"{}>"#,
            layer.name,
            num(layer.opacity.clamp(0.0, 1.0)),
            blend_attr(layer.blend)
        );
        for item in &layer.items {
            self.item(item);
        }
        self.body.push_str("</g>");
    }

    fn item(&mut self, item: &DrawItem) {
        let mut attrs = format!(r#" opacity="{}""#, num(item.opacity.clamp(0.0, 1.0)));
        attrs.push_str(&blend_attr(item.blend));
        if item.transform != Affine::IDENTITY {
            let [a, b, c, d, e, f] = item.transform.as_coeffs();
            let _ = write!(
                attrs,
                r#" transform="matrix({} {} {} {} {} {})""#,
                num(a),
                num(b),
                num(c),
                num(d),
                num(e),
                num(f)
            );
        }

        let glow = match &item.shape {
            Shape::Text(run) => run.glow,
            _ => 0.0,
        };
        if item.blur > 0.0 || glow > 0.0 {
            let region = shape_bounds(&item.shape).inflate(
                3.0 * item.blur + 3.0 * glow,
                3.0 * item.blur + 3.0 * glow,
            );
            let id = self.blur_filter(item.blur, glow, region);
            let _ = write!(attrs, r#" filter="url(#{id})""#);
        }

        match &item.shape {
            Shape::Rect(r) => {
                let fill = self.paint(&item.paint);
                let _ = write!(
                    self.body,
                    r#"<rect x="{}" y="{}" width="{}" height="{}"{fill}{attrs}/>"#,
                    num(r.x0),
                    num(r.y0),
                    num(r.width()),
                    num(r.height())
                );
            }
            Shape::Polygon(points) => {
                let fill = self.paint(&item.paint);
                let mut pts = String::with_capacity(points.len() * 16);
                for p in points {
                    let _ = write!(pts, "{},{} ", num(p.x), num(p.y));
                }
                let _ = write!(
                    self.body,
                    r#"<polygon points="{}"{fill}{attrs}/>"#,
                    pts.trim_end()
                );
            }
            Shape::Circle { center, radius } => {
                let fill = self.paint(&item.paint);
                let _ = write!(
                    self.body,
                    r#"<circle cx="{}" cy="{}" r="{}"{fill}{attrs}/>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius)
                );
            }
            Shape::Text(run) => {
                let fill = self.paint(&item.paint);
                self.text(run, &fill, &attrs);
            }
            Shape::Noise { rect, noise } => {
                let id = self.noise_filter(noise);
                let _ = write!(
                    self.body,
                    r#"<g{attrs}><rect x="{}" y="{}" width="{}" height="{}" filter="url(#{id})"/></g>"#,
                    num(rect.x0),
                    num(rect.y0),
                    num(rect.width()),
                    num(rect.height())
                );
            }
            Shape::Stripes {
                rect,
                period,
                thickness,
            } => {
                let id = self.id("stripes");
                let color = paint_color(&item.paint);
                let _ = write!(
                    self.defs,
                    r#"<pattern id="{id}" patternUnits="userSpaceOnUse" x="0" y="0" width="{w}" height="{p}"><rect y="{y}" width="{w}" height="{t}" fill="{c}" fill-opacity="{a}"/></pattern>"#,
                    w = num(rect.width().max(1.0)),
                    p = num(period.max(1.0)),
                    y = num(((period - thickness) / 2.0).max(0.0)),
                    t = num(*thickness),
                    c = color.to_hex_rgb(),
                    a = num(color.opacity()),
                );
                let _ = write!(
                    self.body,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="url(#{id})"{attrs}/>"#,
                    num(rect.x0),
                    num(rect.y0),
                    num(rect.width()),
                    num(rect.height())
                );
            }
            Shape::InsetShadow { rect, spread } => {
                let id = self.id("inset");
                let color = paint_color(&item.paint);
                let region = rect.inflate(*spread, *spread);
                let _ = write!(
                    self.defs,
                    r#"<filter id="{id}" filterUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                    num(region.x0),
                    num(region.y0),
                    num(region.width()),
                    num(region.height()),
                    num(spread / 2.0),
                );
                let _ = write!(
                    self.body,
                    r#"<g{attrs}><rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-opacity="{}" stroke-width="{}" filter="url(#{id})"/></g>"#,
                    num(rect.x0),
                    num(rect.y0),
                    num(rect.width()),
                    num(rect.height()),
                    color.to_hex_rgb(),
                    num(color.opacity()),
                    num(*spread),
                );
            }
        }
    }

    fn text(&mut self, run: &TextRun, fill: &str, attrs: &str) {
        let _ = write!(
            self.body,
            r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{}" letter-spacing="{}"{fill}{attrs}>{}</text>"#,
            num(run.center.x),
            num(run.center.y),
            escape(&run.font_family),
            num(run.font_size),
            num(run.letter_spacing),
            escape(&run.text),
        );
    }

    /// Return ` fill="..."` attributes for `paint`, emitting gradient defs as needed.
    fn paint(&mut self, paint: &Paint) -> String {
        match paint {
            Paint::Solid(c) => solid_fill(*c),
            Paint::VerticalGradient(stops) => {
                let id = self.id("lg");
                let _ = write!(
                    self.defs,
                    r#"<linearGradient id="{id}" x1="0" y1="0" x2="0" y2="1">{}</linearGradient>"#,
                    stops_svg(stops)
                );
                format!(r#" fill="url(#{id})""#)
            }
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let id = self.id("rg");
                let _ = write!(
                    self.defs,
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}">{}</radialGradient>"#,
                    num(center.x),
                    num(center.y),
                    num(radius.max(1e-3)),
                    stops_svg(stops)
                );
                format!(r#" fill="url(#{id})""#)
            }
        }
    }

    fn blur_filter(&mut self, blur: f64, glow: f64, region: Rect) -> String {
        let id = self.id("fx");
        let _ = write!(
            self.defs,
            r#"<filter id="{id}" filterUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}" color-interpolation-filters="sRGB">"#,
            num(region.x0),
            num(region.y0),
            num(region.width().max(1.0)),
            num(region.height().max(1.0)),
        );
        let mut input = "SourceGraphic";
        if glow > 0.0 {
            let _ = write!(
                self.defs,
                r#"<feGaussianBlur in="SourceGraphic" stdDeviation="{}" result="halo"/><feMerge result="glow"><feMergeNode in="halo"/><feMergeNode in="halo"/><feMergeNode in="SourceGraphic"/></feMerge>"#,
                num(glow / 2.0)
            );
            input = "glow";
        }
        if blur > 0.0 {
            let _ = write!(
                self.defs,
                r#"<feGaussianBlur in="{input}" stdDeviation="{}"/>"#,
                num(blur)
            );
        }
        self.defs.push_str("</filter>");
        id
    }

    fn noise_filter(&mut self, noise: &NoiseSpec) -> String {
        let id = self.id("noise");
        let _ = write!(
            self.defs,
            r#"<filter id="{id}" x="0" y="0" width="1" height="1" color-interpolation-filters="sRGB"><feTurbulence type="fractalNoise" baseFrequency="{}" numOctaves="{}" seed="{}" stitchTiles="stitch"/>"#,
            num(noise.base_frequency),
            noise.octaves.max(1),
            noise.seed,
        );
        if noise.monochrome {
            self.defs
                .push_str(r#"<feColorMatrix type="saturate" values="0"/>"#);
        }
        if noise.contrast != 1.0 || noise.brightness != 1.0 {
            let slope = noise.contrast * noise.brightness;
            let intercept = (0.5 - 0.5 * noise.contrast) * noise.brightness;
            let f = format!(
                r#"type="linear" slope="{}" intercept="{}""#,
                num(slope),
                num(intercept)
            );
            let _ = write!(
                self.defs,
                "<feComponentTransfer><feFuncR {f}/><feFuncG {f}/><feFuncB {f}/></feComponentTransfer>"
            );
        }
        self.defs.push_str("</filter>");
        id
    }

    /// Red and cyan fringes offset horizontally around the stage group.
    fn chromatic_filter(&mut self, offset: f64, canvas: Rect) -> Option<String> {
        if !(offset.abs() > 1e-3) {
            return None;
        }
        let id = self.id("chroma");
        let region = canvas.inflate(offset.abs() + 8.0, 8.0);
        let _ = write!(
            self.defs,
            r##"<filter id="{id}" filterUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}" color-interpolation-filters="sRGB"><feDropShadow dx="{}" dy="0" stdDeviation="0" flood-color="#ff0000" flood-opacity="0.3" result="red"/><feDropShadow in="red" dx="{}" dy="0" stdDeviation="0" flood-color="#00ffff" flood-opacity="0.2"/></filter>"##,
            num(region.x0),
            num(region.y0),
            num(region.width()),
            num(region.height()),
            num(offset),
            num(-offset / 2.0),
        );
        Some(id)
    }
}

/// User-space bounds of a shape before its transform. Text is estimated from its metrics.
fn shape_bounds(shape: &Shape) -> Rect {
    match shape {
        Shape::Rect(r) => *r,
        Shape::Polygon(points) => {
            let mut it = points.iter();
            let Some(first) = it.next() else {
                return Rect::ZERO;
            };
            it.fold(Rect::from_points(*first, *first), |r, p| {
                r.union_pt(*p)
            })
        }
        Shape::Circle { center, radius } => {
            Rect::from_center_size(*center, (2.0 * radius, 2.0 * radius))
        }
        Shape::Text(run) => {
            let n = run.text.chars().count() as f64;
            let w = n * (run.font_size * 0.75 + run.letter_spacing.abs());
            Rect::from_center_size(run.center, (w.max(run.font_size), run.font_size * 1.5))
        }
        Shape::Noise { rect, .. }
        | Shape::Stripes { rect, .. }
        | Shape::InsetShadow { rect, .. } => *rect,
    }
}

fn solid_fill(c: Color) -> String {
    if c.a == 255 {
        format!(r#" fill="{}""#, c.to_hex_rgb())
    } else {
        format!(
            r#" fill="{}" fill-opacity="{}""#,
            c.to_hex_rgb(),
            num(c.opacity())
        )
    }
}

fn paint_color(paint: &Paint) -> Color {
    match paint {
        Paint::Solid(c) => *c,
        Paint::VerticalGradient(stops) | Paint::Radial { stops, .. } => {
            stops.last().map(|s| s.color).unwrap_or(Color::BLACK)
        }
    }
}

fn stops_svg(stops: &[GradientStop]) -> String {
    let mut s = String::new();
    for stop in stops {
        let _ = write!(
            s,
            r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
            num(stop.offset.clamp(0.0, 1.0)),
            stop.color.to_hex_rgb(),
            num(stop.color.opacity())
        );
    }
    s
}

fn blend_attr(blend: Blend) -> String {
    match blend {
        Blend::Normal => String::new(),
        other => format!(r#" style="mix-blend-mode:{}""#, other.css_name()),
    }
}

/// Compact decimal: at most three fractional digits, no trailing zeros, never NaN.
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_owned(),
        other => other.to_owned(),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::{Canvas, FrameIndex, Point, Vec2},
        render::display::{LayerOutput, ZBand},
    };

    fn scene(layers: Vec<LayerOutput>, chromatic: f64) -> Scene {
        Scene {
            frame: FrameIndex(0),
            canvas: Canvas {
                width: 64,
                height: 32,
            },
            background: Color::rgb(2, 0, 2),
            shake: Vec2::new(3.0, -4.5),
            chromatic,
            layers,
        }
    }

    #[test]
    fn num_is_compact() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.25), "0.25");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(f64::NAN), "0");
        assert_eq!(num(2.0 / 3.0), "0.667");
    }

    #[test]
    fn escapes_text() {
        assert_eq!(escape(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn document_has_background_and_shake() {
        let svg = scene_to_svg(&scene(Vec::new(), 0.0));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r##"fill="#020002""##));
        assert!(svg.contains("translate(3 -4.5)"));
    }

    #[test]
    fn stage_layers_share_one_chromatic_group() {
        let mut a = LayerOutput::new("a", ZBand::Stage);
        a.push(DrawItem::solid(
            Shape::Polygon(vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
            ]),
            Color::WHITE,
        ));
        let mut b = a.clone();
        b.name = "b";
        let mut c = LayerOutput::new("c", ZBand::Post);
        c.push(DrawItem::solid(Shape::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)), Color::BLACK));

        let svg = scene_to_svg(&scene(vec![a, b, c], 12.0));
        assert_eq!(svg.matches("feDropShadow").count(), 2);
        assert_eq!(svg.matches(r#"filter="url(#chroma"#).count(), 1);
        let group = svg.find("url(#chroma").unwrap();
        let post = svg.find(r#"data-layer="c""#).unwrap();
        assert!(group < post);
    }

    #[test]
    fn blurred_items_get_a_padded_region() {
        let mut l = LayerOutput::new("l", ZBand::Stage);
        l.push(
            DrawItem::solid(Shape::Rect(Rect::new(10.0, 0.0, 11.0, 32.0)), Color::WHITE)
                .with_blur(20.0),
        );
        let svg = scene_to_svg(&scene(vec![l], 0.0));
        assert!(svg.contains(r#"stdDeviation="20""#));
        assert!(svg.contains(r#"x="-50""#));
    }

    #[test]
    fn text_is_escaped_and_glowing() {
        let mut l = LayerOutput::new("title", ZBand::Title);
        l.push(
            DrawItem::solid(
                Shape::Text(TextRun {
                    text: "A&B".into(),
                    center: Point::ZERO,
                    font_family: "Orbitron".into(),
                    font_size: 20.0,
                    letter_spacing: -2.0,
                    glow: 10.0,
                }),
                Color::rgb(255, 0, 51),
            )
            .with_blend(Blend::Screen),
        );
        let svg = scene_to_svg(&scene(vec![l], 0.0));
        assert!(svg.contains(">A&amp;B</text>"));
        assert!(svg.contains("feMerge"));
        assert!(svg.contains("mix-blend-mode:screen"));
        assert!(svg.contains(r#"letter-spacing="-2""#));
    }
}
