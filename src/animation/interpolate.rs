use crate::{
    animation::ease::Ease,
    foundation::error::{CyberfolioError, CyberfolioResult},
};

/// What happens to inputs outside the first/last breakpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the edge output value.
    #[default]
    Clamp,
    /// Continue the edge segment's slope (eased curve evaluated past its ends).
    Extend,
    /// Return the input unchanged.
    Identity,
}

/// Options for [`interpolate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterpOpts {
    #[serde(default)]
    pub ease: Ease,
    #[serde(default)]
    pub left: Extrapolate,
    #[serde(default)]
    pub right: Extrapolate,
}

impl InterpOpts {
    /// Clamp on both sides, linear.
    pub const CLAMP: InterpOpts = InterpOpts {
        ease: Ease::Linear,
        left: Extrapolate::Clamp,
        right: Extrapolate::Clamp,
    };

    /// Extend on both sides, linear.
    pub const EXTEND: InterpOpts = InterpOpts {
        ease: Ease::Linear,
        left: Extrapolate::Extend,
        right: Extrapolate::Extend,
    };

    /// Same policy with a different easing curve.
    pub const fn eased(self, ease: Ease) -> Self {
        Self { ease, ..self }
    }
}

/// Map `x` through the piecewise-linear table `input -> output`.
///
/// The segment is the last breakpoint `<= x` (capped to the final segment); the normalized
/// position inside it goes through `opts.ease` before mapping to the output span. Never
/// panics: a table shorter than two points returns its single output (or `x` when empty),
/// zero-width segments return the segment start output.
pub fn interpolate(x: f64, input: &[f64], output: &[f64], opts: InterpOpts) -> f64 {
    let n = input.len().min(output.len());
    match n {
        0 => return x,
        1 => return output[0],
        _ => {}
    }

    let seg = find_segment(x, &input[..n]);
    let (in0, in1) = (input[seg], input[seg + 1]);
    let (out0, out1) = (output[seg], output[seg + 1]);

    let mut v = x;
    if v < in0 {
        match opts.left {
            Extrapolate::Identity => return x,
            Extrapolate::Clamp => v = in0,
            Extrapolate::Extend => {}
        }
    }
    if v > in1 {
        match opts.right {
            Extrapolate::Identity => return x,
            Extrapolate::Clamp => v = in1,
            Extrapolate::Extend => {}
        }
    }

    let span = in1 - in0;
    if span == 0.0 || !span.is_finite() {
        return out0;
    }
    let t = opts.ease.curve((v - in0) / span);
    out0 + (out1 - out0) * t
}

/// Two-point clamped interpolation, the common case in layer code.
pub fn remap(x: f64, from: [f64; 2], to: [f64; 2]) -> f64 {
    interpolate(x, &from, &to, InterpOpts::CLAMP)
}

fn find_segment(x: f64, input: &[f64]) -> usize {
    let last_seg = input.len() - 2;
    let mut seg = 0;
    for i in 1..=last_seg {
        if input[i] <= x {
            seg = i;
        } else {
            break;
        }
    }
    seg
}

/// A validated breakpoint table, for tables that come from configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interpolator {
    input: Vec<f64>,
    output: Vec<f64>,
    #[serde(default)]
    opts: InterpOpts,
}

impl Interpolator {
    /// Validate and build a table.
    pub fn new(input: Vec<f64>, output: Vec<f64>, opts: InterpOpts) -> CyberfolioResult<Self> {
        let this = Self {
            input,
            output,
            opts,
        };
        this.validate()?;
        Ok(this)
    }

    pub fn validate(&self) -> CyberfolioResult<()> {
        if self.input.len() < 2 {
            return Err(CyberfolioError::animation(
                "interpolation needs at least two breakpoints",
            ));
        }
        if self.input.len() != self.output.len() {
            return Err(CyberfolioError::animation(format!(
                "input has {} breakpoints but output has {}",
                self.input.len(),
                self.output.len()
            )));
        }
        if self
            .input
            .iter()
            .chain(self.output.iter())
            .any(|v| !v.is_finite())
        {
            return Err(CyberfolioError::animation(
                "interpolation breakpoints must be finite",
            ));
        }
        if !self.input.windows(2).all(|w| w[0] < w[1]) {
            return Err(CyberfolioError::animation(
                "interpolation inputs must be strictly increasing",
            ));
        }
        Ok(())
    }

    /// Evaluate at `x`.
    pub fn sample(&self, x: f64) -> f64 {
        interpolate(x, &self.input, &self.output, self.opts)
    }

    /// Smallest and largest configured output.
    pub fn output_bounds(&self) -> (f64, f64) {
        self.output
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}
