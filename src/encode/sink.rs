use crate::{
    foundation::{
        core::{Fps, FrameIndex},
        error::{CyberfolioError, CyberfolioResult},
    },
    render::frame::FrameRGBA,
};
use std::path::PathBuf;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional soundtrack muxed under the video.
    pub audio: Option<AudioTrack>,
}

/// Compressed audio file (mp3, ogg, wav...) to lay under the intro.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    pub path: PathBuf,
    /// Loop the file until the video ends.
    pub looped: bool,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order within the requested
/// render range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> CyberfolioResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CyberfolioResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> CyberfolioResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Frames in timeline order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> CyberfolioResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CyberfolioResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CyberfolioResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes `frame_00042.png`-style files into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    written: u64,
    last_idx: Option<FrameIndex>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_owned(),
            written: 0,
            last_idx: None,
        }
    }

    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, idx.0))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> CyberfolioResult<()> {
        use anyhow::Context as _;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frame directory '{}'", self.dir.display()))?;
        self.written = 0;
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CyberfolioResult<()> {
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(CyberfolioError::encode(
                "png sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);
        frame.save_png(&self.path_for(idx))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> CyberfolioResult<()> {
        tracing::info!(frames = self.written, dir = %self.dir.display(), "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_paths_are_zero_padded() {
        let sink = PngSequenceSink::new("/tmp/out");
        assert_eq!(
            sink.path_for(FrameIndex(42)),
            PathBuf::from("/tmp/out/frame_00042.png")
        );
    }

    #[test]
    fn png_sink_rejects_rewinds() {
        let dir = std::env::temp_dir().join(format!("cyberfolio-png-{}", std::process::id()));
        let mut sink = PngSequenceSink::new(&dir);
        sink.begin(SinkConfig {
            width: 1,
            height: 1,
            fps: Fps::SIXTY,
            audio: None,
        })
        .unwrap();
        let frame = FrameRGBA {
            width: 1,
            height: 1,
            data: vec![255, 0, 51, 255],
            premultiplied: true,
        };
        sink.push_frame(FrameIndex(3), &frame).unwrap();
        assert!(sink.push_frame(FrameIndex(3), &frame).is_err());
        assert_eq!(sink.written(), 1);
        assert!(dir.join("frame_00003.png").is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
