use crate::sphere::mesh::{Triangle, Vec3};
use std::f64::consts::PI;

/// Grayscale render target, row-major, values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LumaBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl LumaBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| f64::from(v)).sum::<f64>() / self.data.len() as f64
    }
}

/// Perspective camera looking at `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
}

struct ViewBasis {
    eye: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    focal: f64,
}

impl Camera {
    fn basis(&self) -> ViewBasis {
        let forward = (self.target - self.eye).normalized();
        let mut right = forward.cross(Vec3::UP).normalized();
        if right == Vec3::ZERO {
            right = Vec3::new(1.0, 0.0, 0.0);
        }
        ViewBasis {
            eye: self.eye,
            right,
            up: right.cross(forward),
            forward,
            focal: 1.0 / (self.fov_deg.to_radians() / 2.0).tan(),
        }
    }
}

/// Point light without distance falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f64,
}

/// Surface response of a draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    /// Lit, flat-shaded white with a faint Blinn-Phong highlight.
    Phong { shininess: f64, specular: f64 },
    /// Unlit constant gray, alpha-blended over what is already drawn.
    Basic { value: f64, opacity: f64 },
}

impl Material {
    fn is_opaque(self) -> bool {
        match self {
            Material::Phong { .. } => true,
            Material::Basic { opacity, .. } => opacity >= 1.0,
        }
    }
}

/// Triangles placed in the world by a translation.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    pub triangles: &'a [Triangle],
    pub offset: Vec3,
    pub material: Material,
}

/// Small CPU rasterizer for the sphere widget.
///
/// Renders at `supersample`× the target resolution with a reciprocal-depth buffer and
/// box-filters down, so each output cell is the average brightness of its area. Opaque
/// calls draw first, translucent ones after, both depth-tested and back-face culled.
#[derive(Clone, Copy, Debug)]
pub struct SoftRasterizer {
    pub width: u32,
    pub height: u32,
    pub supersample: u32,
}

struct Target {
    w: usize,
    h: usize,
    color: Vec<f64>,
    inv_depth: Vec<f64>,
}

impl SoftRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            supersample: 2,
        }
    }

    pub fn render(
        &self,
        camera: &Camera,
        lights: &[PointLight],
        calls: &[DrawCall<'_>],
    ) -> LumaBuffer {
        let ss = self.supersample.max(1);
        let (w, h) = ((self.width * ss) as usize, (self.height * ss) as usize);
        let mut target = Target {
            w,
            h,
            color: vec![0.0; w * h],
            inv_depth: vec![0.0; w * h],
        };
        let basis = camera.basis();
        let aspect = if h == 0 { 1.0 } else { w as f64 / h as f64 };

        let opaque = calls.iter().filter(|c| c.material.is_opaque());
        let translucent = calls.iter().filter(|c| !c.material.is_opaque());
        for call in opaque.chain(translucent) {
            for tri in call.triangles {
                let value = shade(tri, call, camera, lights);
                draw_triangle(&mut target, &basis, camera, aspect, tri, call, value);
            }
        }

        let mut out = LumaBuffer::new(self.width, self.height);
        let ss = ss as usize;
        let norm = 1.0 / (ss * ss) as f64;
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                let mut acc = 0.0;
                for sy in 0..ss {
                    let row = (y * ss + sy) * w;
                    for sx in 0..ss {
                        acc += target.color[row + x * ss + sx];
                    }
                }
                out.data[y * self.width as usize + x] = (acc * norm).clamp(0.0, 1.0) as f32;
            }
        }
        out
    }
}

fn shade(tri: &Triangle, call: &DrawCall<'_>, camera: &Camera, lights: &[PointLight]) -> f64 {
    match call.material {
        Material::Basic { value, .. } => value,
        Material::Phong {
            shininess,
            specular,
        } => {
            let n = tri.normal;
            let p = tri.centroid() + call.offset;
            let v = (camera.eye - p).normalized();
            let mut out = 0.0;
            for light in lights {
                let l = (light.position - p).normalized();
                let ndl = n.dot(l).max(0.0);
                if ndl == 0.0 {
                    continue;
                }
                let half = (l + v).normalized();
                let highlight = specular * 0.25 * (shininess * 0.5 + 1.0) / PI
                    * n.dot(half).max(0.0).powf(shininess);
                out += light.intensity * ndl * (1.0 / PI + highlight);
            }
            out.min(1.0)
        }
    }
}

fn draw_triangle(
    target: &mut Target,
    basis: &ViewBasis,
    camera: &Camera,
    aspect: f64,
    tri: &Triangle,
    call: &DrawCall<'_>,
    value: f64,
) {
    let mut screen = [(0.0, 0.0, 0.0); 3];
    for (slot, p) in screen.iter_mut().zip([tri.a, tri.b, tri.c]) {
        let rel = p + call.offset - basis.eye;
        let depth = rel.dot(basis.forward);
        if depth < camera.near || depth > camera.far {
            return;
        }
        let ndc_x = rel.dot(basis.right) * basis.focal / (aspect * depth);
        let ndc_y = rel.dot(basis.up) * basis.focal / depth;
        *slot = (
            (ndc_x + 1.0) * 0.5 * target.w as f64,
            (1.0 - ndc_y) * 0.5 * target.h as f64,
            1.0 / depth,
        );
    }

    let [(x0, y0, z0), (x1, y1, z1), (x2, y2, z2)] = screen;
    // Screen y points down, so counter-clockwise faces have negative area here.
    let area = (x1 - x0) * (y2 - y0) - (y1 - y0) * (x2 - x0);
    if area >= 0.0 {
        return;
    }

    let min_x = x0.min(x1).min(x2).floor().max(0.0) as usize;
    let max_x = (x0.max(x1).max(x2).ceil() as usize).min(target.w);
    let min_y = y0.min(y1).min(y2).floor().max(0.0) as usize;
    let max_y = (y0.max(y1).max(y2).ceil() as usize).min(target.h);

    let (blend, alpha) = match call.material {
        Material::Basic { opacity, .. } if opacity < 1.0 => (true, opacity.max(0.0)),
        _ => (false, 1.0),
    };

    for py in min_y..max_y {
        let cy = py as f64 + 0.5;
        for px in min_x..max_x {
            let cx = px as f64 + 0.5;
            let w0 = ((x2 - x1) * (cy - y1) - (y2 - y1) * (cx - x1)) / area;
            let w1 = ((x0 - x2) * (cy - y2) - (y0 - y2) * (cx - x2)) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let inv_z = w0 * z0 + w1 * z1 + w2 * z2;
            let i = py * target.w + px;
            if inv_z <= target.inv_depth[i] {
                continue;
            }
            target.inv_depth[i] = inv_z;
            target.color[i] = if blend {
                value * alpha + target.color[i] * (1.0 - alpha)
            } else {
                value
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere::mesh::{floor_plane, uv_sphere};

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 120.0, 400.0),
            target: Vec3::ZERO,
            fov_deg: 70.0,
            near: 1.0,
            far: 1000.0,
        }
    }

    fn phong() -> Material {
        Material::Phong {
            shininess: 30.0,
            specular: 0.067,
        }
    }

    #[test]
    fn empty_scene_is_black() {
        let out = SoftRasterizer::new(8, 8).render(&camera(), &[], &[]);
        assert_eq!(out.mean(), 0.0);
    }

    #[test]
    fn lit_sphere_is_brightest_towards_the_light() {
        let tris = uv_sphere(160.0, 20, 10);
        let lights = [PointLight {
            position: Vec3::new(500.0, 500.0, 500.0),
            intensity: 5.0,
        }];
        let out = SoftRasterizer::new(40, 40).render(
            &camera(),
            &lights,
            &[DrawCall {
                triangles: &tris,
                offset: Vec3::ZERO,
                material: phong(),
            }],
        );
        // Upper right faces the light; lower left is in shadow.
        assert!(out.get(26, 14) > out.get(13, 26));
        assert_eq!(out.get(0, 0), 0.0);
    }

    #[test]
    fn translucent_floor_blends_over_black() {
        let floor = floor_plane(400.0, -160.0);
        let out = SoftRasterizer::new(20, 20).render(
            &camera(),
            &[],
            &[DrawCall {
                triangles: &floor,
                offset: Vec3::ZERO,
                material: Material::Basic {
                    value: 0.2,
                    opacity: 0.8,
                },
            }],
        );
        let v = out.get(10, 19);
        assert!((f64::from(v) - 0.16).abs() < 1e-6, "{v}");
    }

    #[test]
    fn back_faces_are_culled() {
        // Seen from below, the up-facing floor disappears.
        let floor = floor_plane(400.0, 0.0);
        let below = Camera {
            eye: Vec3::new(0.0, -300.0, 300.0),
            ..camera()
        };
        let out = SoftRasterizer::new(16, 16).render(
            &below,
            &[],
            &[DrawCall {
                triangles: &floor,
                offset: Vec3::ZERO,
                material: Material::Basic {
                    value: 1.0,
                    opacity: 1.0,
                },
            }],
        );
        assert_eq!(out.mean(), 0.0);
    }
}
