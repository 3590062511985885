use crate::{
    animation::interpolate::{InterpOpts, interpolate},
    foundation::{color::Color, core::Rect},
    layers::{Layer, stage::Point3},
    render::display::{DrawItem, GradientStop, LayerOutput, Paint, Shape, ZBand},
    scene::timeline::FrameCtx,
};

const COUNT: usize = 500;
const TRAIL_LEN: f64 = 150.0;

/// Position and look of one depth particle, a pure function of `(index, frame)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Horizontal position in percent of the canvas width (may fall outside 0..100).
    pub x_pct: f64,
    /// Height above the bottom edge in percent of the canvas height.
    pub y_pct: f64,
    /// Depth in pixels, `-3000..=0`.
    pub z: f64,
    pub size: f64,
    pub hero: bool,
    pub trail: bool,
    pub opacity: f64,
}

impl Particle {
    pub fn at(index: usize, frame: u64) -> Self {
        let seed = index as f64 * 23.5;
        let t = frame as f64;
        let z = -((seed * 47.0) % 3000.0);
        let y_offset = (seed * 11.0) % 100.0;
        let speed = 1.0 + seed % 3.0;
        let y_pct = interpolate(
            (t * speed + y_offset) % 250.0,
            &[0.0, 250.0],
            &[250.0, -150.0],
            InterpOpts::CLAMP,
        );
        let flicker = if (t / 8.0 + seed).sin() > 0.3 { 1.0 } else { 0.2 };
        Self {
            x_pct: seed % 140.0 - 20.0,
            y_pct,
            z,
            size: if index % 25 == 0 { 4.0 } else { 1.0 },
            hero: index % 15 == 0,
            trail: index % 4 == 0,
            opacity: interpolate(z, &[-3000.0, 0.0], &[0.0, 1.0], InterpOpts::CLAMP) * flicker,
        }
    }
}

/// Five hundred sparks falling through the stage at different depths, some with trails.
pub struct DepthParticles;

impl Layer for DepthParticles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn z(&self) -> ZBand {
        ZBand::Stage
    }

    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput) {
        out.opacity = interpolate(ctx.transition, &[0.3, 1.0], &[0.0, 1.0], InterpOpts::CLAMP);
        if out.opacity <= 0.0 {
            return;
        }

        let (w, h) = (ctx.width(), ctx.height());
        let palette = &ctx.config.palette;
        let trail_paint = Paint::VerticalGradient(vec![
            GradientStop::new(0.0, Color { a: 0, ..palette.primary }),
            GradientStop::new(1.0, palette.primary),
        ]);

        for i in 0..COUNT {
            let p = Particle::at(i, ctx.frame.0);
            if p.opacity <= 0.0 {
                continue;
            }
            let x = p.x_pct / 100.0 * w;
            let top = h - p.y_pct / 100.0 * h - p.size;

            if p.trail {
                let cx = x + p.size / 2.0;
                let rect = Rect::new(cx - 0.5, top, cx + 0.5, top + TRAIL_LEN);
                if let Some((poly, _)) = ctx.stage.project_rect(rect, p.z) {
                    out.push(
                        DrawItem::new(Shape::Polygon(poly), trail_paint.clone())
                            .with_opacity(0.15 * p.opacity),
                    );
                }
            }

            let center = Point3::new(x + p.size / 2.0, top + p.size / 2.0, p.z);
            if let Some((c, k)) = ctx.stage.project(center) {
                let color = if p.hero { palette.bright } else { palette.primary };
                out.push(
                    DrawItem::solid(
                        Shape::Circle {
                            center: c,
                            radius: (p.size / 2.0 * k).max(0.25),
                        },
                        color,
                    )
                    .with_opacity(p.opacity),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particles_are_pure_functions_of_index_and_frame() {
        for i in [0, 1, 24, 25, 499] {
            for f in [0, 90, 299, 5000] {
                assert_eq!(Particle::at(i, f), Particle::at(i, f));
            }
        }
    }

    #[test]
    fn depth_fades_far_particles() {
        for i in 0..COUNT {
            let p = Particle::at(i, 120);
            assert!((-3000.0..=0.0).contains(&p.z));
            assert!((0.0..=1.0).contains(&p.opacity));
            assert!((-150.0..=250.0).contains(&p.y_pct));
        }
        let front = Particle::at(0, 0);
        assert_eq!(front.z, 0.0);
        assert!(front.hero && front.trail);
        assert_eq!(front.size, 4.0);
    }

    #[test]
    fn particles_drift_down_and_wrap() {
        // Index 1: speed 1 + 23.5 % 3 = 3.5, so its height drops 5.6% per frame until it wraps.
        let a = Particle::at(1, 10);
        let b = Particle::at(1, 11);
        assert!(b.y_pct < a.y_pct || b.y_pct > 200.0);
    }
}
