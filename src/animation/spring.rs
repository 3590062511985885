use crate::foundation::{
    core::Fps,
    error::{CyberfolioError, CyberfolioResult},
};

/// Damped harmonic oscillator parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpringConfig {
    pub damping: f64,
    pub stiffness: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
}

fn default_mass() -> f64 {
    1.0
}

impl SpringConfig {
    pub const fn new(damping: f64, stiffness: f64, mass: f64) -> Self {
        Self {
            damping,
            stiffness,
            mass,
        }
    }

    pub fn validate(&self) -> CyberfolioResult<()> {
        for (name, v) in [
            ("damping", self.damping),
            ("stiffness", self.stiffness),
            ("mass", self.mass),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CyberfolioError::animation(format!(
                    "spring {name} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// `c / (2 * sqrt(k * m))`.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(10.0, 100.0, 1.0)
    }
}

/// Unit-step response of a damped spring released from rest at 0 toward 1.
///
/// `frame_offset` is `current_frame - start_frame`; the spring is evaluated at
/// `t = frame_offset / fps` seconds. Offsets below zero return exactly `0.0`. Under-damped
/// configurations overshoot past 1 before settling.
pub fn spring(frame_offset: i64, fps: Fps, cfg: SpringConfig) -> f64 {
    if frame_offset < 0 {
        return 0.0;
    }
    let t = fps.frames_to_secs(frame_offset as f64);
    step_response(t, cfg)
}

/// Same as [`spring`] for a continuous time in seconds.
pub fn step_response(t: f64, cfg: SpringConfig) -> f64 {
    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    let (c, k, m) = (
        cfg.damping.max(f64::EPSILON),
        cfg.stiffness.max(f64::EPSILON),
        cfg.mass.max(f64::EPSILON),
    );
    let omega0 = (k / m).sqrt();
    let zeta = c / (2.0 * (k * m).sqrt());

    let x = if zeta < 1.0 {
        let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
        let envelope = (-zeta * omega0 * t).exp();
        1.0 - envelope * ((omega1 * t).cos() + (zeta * omega0 / omega1) * (omega1 * t).sin())
    } else if zeta == 1.0 {
        let envelope = (-omega0 * t).exp();
        1.0 - envelope * (1.0 + omega0 * t)
    } else {
        // Expanded cosh/sinh so neither factor overflows for large t.
        let omega2 = omega0 * (zeta * zeta - 1.0).sqrt();
        let r_slow = -zeta * omega0 + omega2;
        let r_fast = -zeta * omega0 - omega2;
        let q = zeta * omega0 / omega2;
        1.0 - 0.5 * ((1.0 + q) * (r_slow * t).exp() + (1.0 - q) * (r_fast * t).exp())
    };

    if x.is_finite() { x } else { 1.0 }
}
