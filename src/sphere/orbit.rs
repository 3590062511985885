use crate::sphere::mesh::Vec3;
use std::f64::consts::PI;

const POLAR_EPS: f64 = 1e-3;

/// Orbit camera rig: rotate only, no zoom and no pan.
///
/// The camera sits on a sphere around `target`, described by an azimuth (`theta`, around
/// +y, zero on +z) and a polar angle (`phi`, from +y). Auto-rotation turns the azimuth at
/// `auto_rotate_speed` revolutions per minute while no drag is in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitControls {
    target: Vec3,
    radius: f64,
    theta: f64,
    phi: f64,
    pub auto_rotate_speed: f64,
    /// Drag sensitivity; a drag the height of the viewport turns a full circle at 1.0.
    pub rotate_speed: f64,
    viewport_height: f64,
    drag_from: Option<(f64, f64)>,
}

impl OrbitControls {
    pub fn new(eye: Vec3, target: Vec3, viewport_height: f64) -> Self {
        let off = eye - target;
        let radius = off.length();
        let (theta, phi) = if radius > 0.0 {
            (off.x.atan2(off.z), (off.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };
        Self {
            target,
            radius,
            theta,
            phi: phi.clamp(POLAR_EPS, PI - POLAR_EPS),
            auto_rotate_speed: 0.0,
            rotate_speed: 1.0,
            viewport_height: viewport_height.max(1.0),
            drag_from: None,
        }
    }

    pub fn with_auto_rotate(mut self, speed: f64) -> Self {
        self.auto_rotate_speed = speed;
        self
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn azimuth(&self) -> f64 {
        self.theta
    }

    pub fn polar(&self) -> f64 {
        self.phi
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    pub fn eye(&self) -> Vec3 {
        let s = self.phi.sin();
        self.target
            + Vec3::new(
                self.radius * s * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * s * self.theta.cos(),
            )
    }

    /// Advance auto-rotation by `dt_secs` of wall time.
    pub fn update(&mut self, dt_secs: f64) {
        if self.drag_from.is_none() && dt_secs > 0.0 {
            self.theta -= 2.0 * PI / 60.0 * self.auto_rotate_speed * dt_secs;
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.drag_from = Some((x, y));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let Some((x0, y0)) = self.drag_from else {
            return;
        };
        let k = 2.0 * PI * self.rotate_speed / self.viewport_height;
        self.theta -= (x - x0) * k;
        self.phi = (self.phi - (y - y0) * k).clamp(POLAR_EPS, PI - POLAR_EPS);
        self.drag_from = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.drag_from = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> OrbitControls {
        OrbitControls::new(Vec3::new(0.0, 120.0, 400.0), Vec3::ZERO, 400.0).with_auto_rotate(2.0)
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn round_trips_the_initial_eye() {
        assert!(close(rig().eye(), Vec3::new(0.0, 120.0, 400.0)));
    }

    #[test]
    fn speed_two_turns_once_every_thirty_seconds() {
        let mut c = rig();
        let start = c.eye();
        c.update(15.0);
        assert!(close(c.eye(), Vec3::new(0.0, 120.0, -400.0)));
        c.update(15.0);
        assert!(close(c.eye(), start));
    }

    #[test]
    fn radius_is_fixed() {
        let mut c = rig();
        let r = c.eye().length();
        c.pointer_down(0.0, 0.0);
        c.pointer_move(37.0, -80.0);
        c.update(3.0);
        assert!((c.eye().length() - r).abs() < 1e-9);
    }

    #[test]
    fn drag_pauses_auto_rotate_and_clamps_polar() {
        let mut c = rig();
        c.pointer_down(10.0, 10.0);
        let theta = c.azimuth();
        c.update(5.0);
        assert_eq!(c.azimuth(), theta);
        c.pointer_move(10.0, 10_000.0);
        assert!(c.polar() >= POLAR_EPS);
        c.pointer_up();
        c.update(1.0);
        assert!(c.azimuth() < theta);
    }

    #[test]
    fn moves_without_a_press_are_ignored() {
        let mut c = rig();
        let before = c.clone();
        c.pointer_move(100.0, 100.0);
        assert_eq!(c, before);
    }
}
