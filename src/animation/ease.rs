/// Easing curve applied to a normalized `[0, 1]` segment position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Constant rate, `t`.
    #[default]
    Linear,
    /// Slow start, `t²`.
    InQuad,
    /// Slow finish, mirror of `InQuad`.
    OutQuad,
    /// Quadratic in for the first half, out for the second.
    InOutQuad,
    /// Slow start, `t³`.
    InCubic,
    /// Slow finish, mirror of `InCubic`.
    OutCubic,
    /// Cubic in for the first half, out for the second.
    InOutCubic,
    /// Fast start decaying toward 1 as `1 - 2^(-10t)`, exactly 1 at `t = 1`.
    OutExpo,
}

impl Ease {
    /// Evaluate with `t` clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        self.curve(t.clamp(0.0, 1.0))
    }

    /// Evaluate the raw curve. Values outside `[0, 1]` follow the polynomial, which is what
    /// `Extrapolate::Extend` relies on.
    pub fn curve(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 8] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::OutExpo,
    ];

    #[test]
    fn endpoints_are_stable() {
        for ease in ALL {
            assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
            assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
        }
    }

    #[test]
    fn monotonic_spot_check() {
        for ease in ALL {
            let a = ease.apply(0.25);
            let b = ease.apply(0.5);
            let c = ease.apply(0.75);
            assert!(a < b);
            assert!(b < c);
        }
    }

    #[test]
    fn apply_clamps_but_curve_extends() {
        assert_eq!(Ease::InCubic.apply(2.0), 1.0);
        assert_eq!(Ease::InCubic.curve(2.0), 8.0);
    }
}
