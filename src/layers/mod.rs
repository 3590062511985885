//! Generative layers of the intro.
//!
//! Every layer is a pure function of the shared [`FrameCtx`]: no layer keeps state between
//! frames or reads another layer's output.

pub(crate) mod baseline;
pub(crate) mod grid;
pub(crate) mod haze;
pub(crate) mod noise;
pub(crate) mod overlay;
pub(crate) mod particles;
pub(crate) mod stage;
pub(crate) mod title;

use crate::{
    render::display::{LayerOutput, Scene, ZBand},
    scene::timeline::FrameCtx,
};

/// One generative layer of the intro.
pub trait Layer: Send + Sync {
    fn name(&self) -> &'static str;

    fn z(&self) -> ZBand;

    /// Append this frame's drawables to `out`. Cannot fail; a layer with nothing to show
    /// leaves `out` empty or sets its opacity to zero.
    fn render(&self, ctx: &FrameCtx<'_>, out: &mut LayerOutput);
}

/// Fixed back-to-front stack of layers.
pub struct LayerStack {
    layers: Vec<Box<dyn Layer>>,
}

impl LayerStack {
    /// The full intro: haze, stage, title, noise, scanlines, bezel and vignette.
    pub fn standard() -> Self {
        Self::from_layers(vec![
            Box::new(haze::Haze),
            Box::new(baseline::VerticalBaseline),
            Box::new(grid::DetailedGrid),
            Box::new(particles::DepthParticles),
            Box::new(title::TitleReveal),
            Box::new(noise::StaticOverlay),
            Box::new(noise::GlitchBurst),
            Box::new(noise::Grain),
            Box::new(overlay::Scanlines),
            Box::new(overlay::CrtBezel),
            Box::new(overlay::Vignette),
        ])
    }

    /// Stack from arbitrary layers. Order is stabilized by [`Layer::z`].
    pub fn from_layers(mut layers: Vec<Box<dyn Layer>>) -> Self {
        layers.sort_by_key(|l| l.z());
        Self { layers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    #[tracing::instrument(skip_all, fields(frame = ctx.frame.0))]
    pub fn render(&self, ctx: &FrameCtx<'_>) -> Scene {
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut out = LayerOutput::new(layer.name(), layer.z());
            layer.render(ctx, &mut out);
            if !out.is_empty() {
                layers.push(out);
            }
        }
        tracing::trace!(layers = layers.len(), "scene evaluated");
        Scene {
            frame: ctx.frame,
            canvas: ctx.config.canvas,
            background: ctx.config.palette.background,
            shake: ctx.shake,
            chromatic: ctx.chromatic,
            layers,
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::standard()
    }
}

/// Frame-driven flicker: `sin(t / period + phase)`, mapped from [-1, 1] onto `[lo, hi]`.
pub(crate) fn sine_between(t: f64, period: f64, phase: f64, lo: f64, hi: f64) -> f64 {
    let s = (t / period + phase).sin();
    lo + (s + 1.0) * 0.5 * (hi - lo)
}
