use crate::{
    animation::interpolate::{InterpOpts, interpolate},
    foundation::core::{Canvas, Point, Rect},
};

/// Depth margin kept between clipped geometry and the eye.
const NEAR_EPS: f64 = 1.0;

/// Point on the stage plane before the camera transform.
///
/// `x`/`y` are canvas pixels (origin top-left); `z` is depth in pixels, positive toward the
/// viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// Perspective camera looking at the tilting stage plane.
///
/// Stage points are scaled about the canvas center, rotated about the horizontal axis and
/// then projected with the given perspective distance. At `rotation_x_deg = 0` and
/// `scale = 1` the projection is the identity on `z = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    pub canvas: Canvas,
    pub perspective: f64,
    pub rotation_x_deg: f64,
    pub scale: f64,
}

impl Stage {
    /// Camera pose for a given transition progress and global zoom.
    pub fn from_progress(canvas: Canvas, progress: f64, zoom: f64) -> Self {
        let unit = [0.0, 1.0];
        Self {
            canvas,
            perspective: interpolate(progress, &unit, &[1200.0, 450.0], InterpOpts::EXTEND),
            rotation_x_deg: interpolate(progress, &unit, &[0.0, 88.0], InterpOpts::EXTEND),
            scale: interpolate(progress, &unit, &[1.0, 2.5], InterpOpts::EXTEND) * zoom,
        }
    }

    pub fn width(&self) -> f64 {
        f64::from(self.canvas.width)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.canvas.height)
    }

    /// Camera-space position, origin at the canvas center.
    pub fn to_view(&self, p: Point3) -> Point3 {
        let c = self.canvas.center();
        let (x, y, z) = (
            (p.x - c.x) * self.scale,
            (p.y - c.y) * self.scale,
            p.z * self.scale,
        );
        let (sin, cos) = self.rotation_x_deg.to_radians().sin_cos();
        Point3::new(x, y * cos - z * sin, y * sin + z * cos)
    }

    fn near_limit(&self) -> f64 {
        self.perspective - NEAR_EPS
    }

    fn project_view(&self, v: Point3) -> (Point, f64) {
        let c = self.canvas.center();
        let k = self.perspective / (self.perspective - v.z);
        (Point::new(c.x + v.x * k, c.y + v.y * k), k * self.scale)
    }

    /// Screen position and the local-to-screen size factor, or `None` behind the eye.
    pub fn project(&self, p: Point3) -> Option<(Point, f64)> {
        let v = self.to_view(p);
        if !(v.z < self.near_limit()) {
            return None;
        }
        Some(self.project_view(v))
    }

    /// Project a segment, clipping it at the near plane.
    pub fn project_segment(&self, a: Point3, b: Point3) -> Option<(Point, Point, f64)> {
        let (va, vb) = (self.to_view(a), self.to_view(b));
        let near = self.near_limit();
        let (va, vb) = match (va.z < near, vb.z < near) {
            (true, true) => (va, vb),
            (false, false) => return None,
            (true, false) => (va, va.lerp(vb, (near - va.z) / (vb.z - va.z))),
            (false, true) => (vb.lerp(va, (near - vb.z) / (va.z - vb.z)), vb),
        };
        let (pa, ka) = self.project_view(va);
        let (pb, kb) = self.project_view(vb);
        Some((pa, pb, 0.5 * (ka + kb)))
    }

    /// Project a planar polygon, clipping it at the near plane.
    pub fn project_polygon(&self, pts: &[Point3]) -> Option<(Vec<Point>, f64)> {
        let near = self.near_limit();
        let view: Vec<Point3> = pts.iter().map(|&p| self.to_view(p)).collect();
        let mut clipped = Vec::with_capacity(view.len() + 2);
        for (i, &cur) in view.iter().enumerate() {
            let next = view[(i + 1) % view.len()];
            let (cur_in, next_in) = (cur.z < near, next.z < near);
            if cur_in {
                clipped.push(cur);
            }
            if cur_in != next_in {
                clipped.push(cur.lerp(next, (near - cur.z) / (next.z - cur.z)));
            }
        }
        if clipped.len() < 3 {
            return None;
        }
        let mut k_sum = 0.0;
        let out = clipped
            .iter()
            .map(|&v| {
                let (p, k) = self.project_view(v);
                k_sum += k;
                p
            })
            .collect::<Vec<_>>();
        Some((out, k_sum / clipped.len() as f64))
    }

    /// Project an axis-aligned rectangle lying on the stage at depth `z`.
    pub fn project_rect(&self, r: Rect, z: f64) -> Option<(Vec<Point>, f64)> {
        self.project_polygon(&[
            Point3::new(r.x0, r.y0, z),
            Point3::new(r.x1, r.y0, z),
            Point3::new(r.x1, r.y1, z),
            Point3::new(r.x0, r.y1, z),
        ])
    }
}
