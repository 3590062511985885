use std::path::PathBuf;

use crate::{
    encode::sink::{AudioTrack, FrameSink, SinkConfig},
    foundation::{
        core::{FrameIndex, FrameRange},
        error::{CyberfolioError, CyberfolioResult},
    },
    layers::LayerStack,
    render::{display::Scene, frame::FrameRGBA, raster::SvgRasterizer, svg::scene_to_svg},
    scene::{config::IntroConfig, timeline::Timeline},
};

/// Font sources for the title text.
#[derive(Clone, Debug, Default)]
pub struct FontOptions {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Summary returned by [`IntroRenderer::render_range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub items_total: u64,
}

/// Renders intro frames: timeline, layers, SVG, pixels.
///
/// Frame evaluation is stateless, so frames can be rendered in any order and any number of
/// times with identical results.
pub struct IntroRenderer {
    config: IntroConfig,
    stack: LayerStack,
    raster: SvgRasterizer,
}

impl IntroRenderer {
    pub fn new(config: IntroConfig, fonts: &FontOptions) -> CyberfolioResult<Self> {
        config.validate()?;
        let dirs: Vec<&std::path::Path> = fonts.dirs.iter().map(PathBuf::as_path).collect();
        let files: Vec<&std::path::Path> = fonts.files.iter().map(PathBuf::as_path).collect();
        Ok(Self {
            config,
            stack: LayerStack::standard(),
            raster: SvgRasterizer::new(&dirs, &files)?,
        })
    }

    pub fn config(&self) -> &IntroConfig {
        &self.config
    }

    /// Whole nominal timeline.
    pub fn full_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.config.duration),
        }
    }

    pub fn scene(&self, frame: FrameIndex) -> Scene {
        let ctx = Timeline::new(&self.config).frame_ctx(frame);
        self.stack.render(&ctx)
    }

    pub fn svg(&self, frame: FrameIndex) -> String {
        scene_to_svg(&self.scene(frame))
    }

    #[tracing::instrument(skip(self), fields(frame = frame.0))]
    pub fn render_frame(&self, frame: FrameIndex) -> CyberfolioResult<FrameRGBA> {
        let out = self.raster.rasterize(&self.svg(frame))?;
        let canvas = self.config.canvas;
        if out.width != canvas.width || out.height != canvas.height {
            return Err(CyberfolioError::render(format!(
                "rasterized {}x{}, expected {}x{}",
                out.width, out.height, canvas.width, canvas.height
            )));
        }
        Ok(out)
    }

    /// Render `range` in order into `sink`.
    #[tracing::instrument(skip(self, sink, audio), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
        audio: Option<AudioTrack>,
    ) -> CyberfolioResult<RenderStats> {
        sink.begin(SinkConfig {
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            fps: self.config.fps,
            audio,
        })?;

        let mut stats = RenderStats {
            frames_total: 0,
            items_total: 0,
        };
        for f in range.start.0..range.end.0 {
            let idx = FrameIndex(f);
            let scene = self.scene(idx);
            stats.items_total += scene.item_count() as u64;
            let frame = self.raster.rasterize(&scene_to_svg(&scene))?;
            sink.push_frame(idx, &frame)?;
            stats.frames_total += 1;
            if f % 60 == 0 {
                tracing::debug!(frame = f, "rendered");
            }
        }
        sink.end()?;
        tracing::info!(frames = stats.frames_total, "range rendered");
        Ok(stats)
    }
}
