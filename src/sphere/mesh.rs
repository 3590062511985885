use std::{
    f64::consts::PI,
    ops::{Add, Mul, Neg, Sub},
};

/// World-space vector (y up, right-handed).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f64 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or zero for a zero-length input.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 { self * (1.0 / len) } else { Vec3::ZERO }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, k: f64) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Counter-clockwise (front-facing) triangle with its flat face normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub normal: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            a,
            b,
            c,
            normal: (b - a).cross(c - a).normalized(),
        }
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) * (1.0 / 3.0)
    }
}

/// UV sphere centered at the origin.
///
/// Vertex rings run pole to pole; the cap rows emit one triangle per quad so no
/// degenerate triangles are produced.
pub fn uv_sphere(radius: f64, width_segments: u32, height_segments: u32) -> Vec<Triangle> {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let vertex = |iy: u32, ix: u32| {
        let u = f64::from(ix) / f64::from(w);
        let v = f64::from(iy) / f64::from(h);
        Vec3::new(
            -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
            radius * (v * PI).cos(),
            radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
        )
    };

    let mut out = Vec::with_capacity((2 * w * (h - 1)) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = vertex(iy, ix + 1);
            let b = vertex(iy, ix);
            let c = vertex(iy + 1, ix);
            let d = vertex(iy + 1, ix + 1);
            if iy != 0 {
                out.push(Triangle::new(a, b, d));
            }
            if iy != h - 1 {
                out.push(Triangle::new(b, c, d));
            }
        }
    }
    out
}

/// Square floor of side `size` at height `y`, facing up.
pub fn floor_plane(size: f64, y: f64) -> Vec<Triangle> {
    let h = size / 2.0;
    let p0 = Vec3::new(-h, y, -h);
    let p1 = Vec3::new(h, y, -h);
    let p2 = Vec3::new(-h, y, h);
    let p3 = Vec3::new(h, y, h);
    vec![Triangle::new(p0, p2, p1), Triangle::new(p2, p3, p1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_has_expected_face_count_and_outward_normals() {
        let tris = uv_sphere(200.0, 20, 10);
        assert_eq!(tris.len(), 2 * 20 * 9);
        for t in &tris {
            assert!(t.normal.dot(t.centroid()) > 0.0, "{t:?}");
            assert!((t.normal.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        for t in uv_sphere(160.0, 20, 10) {
            for p in [t.a, t.b, t.c] {
                assert!((p.length() - 160.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn floor_faces_up() {
        let plane = floor_plane(400.0, -160.0);
        assert_eq!(plane.len(), 2);
        for t in plane {
            assert!((t.normal.y - 1.0).abs() < 1e-12);
            assert_eq!(t.a.y, -160.0);
        }
    }

    #[test]
    fn cross_is_right_handed() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::UP;
        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    }
}
