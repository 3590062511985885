use crate::{
    animation::ease::Ease,
    foundation::error::{CyberfolioError, CyberfolioResult},
};

/// Shown instead of the track label once playback has failed.
pub const ERROR_LABEL: &str = "Audio Missing (Check public/audio)";

/// Number of visualizer bars next to the track label.
pub const BAR_COUNT: usize = 5;
const BAR_CYCLE_SECS: f64 = 0.8;
const BAR_STAGGER_SECS: f64 = 0.1;

/// Something that can play one looped track.
pub trait AudioBackend {
    fn play(&mut self) -> CyberfolioResult<()>;

    fn pause(&mut self);

    /// Asynchronous failure reported since the last call (the media element's error
    /// callback). Polled by [`AudioToggle::poll`].
    fn take_error(&mut self) -> Option<CyberfolioError> {
        None
    }
}

/// Observable state of the toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub has_error: bool,
}

/// Play/pause button for the background track.
///
/// A failed play or a backend error callback puts the toggle into its error state. It
/// never retries by itself; the next user toggle tries again and clears the error if that
/// attempt succeeds.
pub struct AudioToggle {
    backend: Box<dyn AudioBackend>,
    state: PlaybackState,
    track_label: String,
    playing_since_ms: Option<u64>,
}

impl AudioToggle {
    pub fn new(backend: Box<dyn AudioBackend>, track_label: impl Into<String>) -> Self {
        Self {
            backend,
            state: PlaybackState::default(),
            track_label: track_label.into(),
            playing_since_ms: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// User click.
    pub fn toggle(&mut self, now_ms: u64) -> PlaybackState {
        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
            self.playing_since_ms = None;
            return self.state;
        }

        match self.backend.play() {
            Ok(()) => {
                self.state = PlaybackState {
                    is_playing: true,
                    has_error: false,
                };
                self.playing_since_ms = Some(now_ms);
            }
            Err(e) => self.fail(&e),
        }
        self.state
    }

    /// Pause if playing. Used on unmount.
    pub fn stop(&mut self) {
        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
            self.playing_since_ms = None;
        }
    }

    /// Pick up asynchronous backend errors.
    pub fn poll(&mut self) -> PlaybackState {
        if let Some(e) = self.backend.take_error() {
            self.fail(&e);
        }
        self.state
    }

    fn fail(&mut self, err: &CyberfolioError) {
        tracing::warn!(error = %err, "audio playback failed");
        self.state = PlaybackState {
            is_playing: false,
            has_error: true,
        };
        self.playing_since_ms = None;
    }

    pub fn label(&self) -> &str {
        if self.state.has_error {
            ERROR_LABEL
        } else {
            &self.track_label
        }
    }

    /// Button glyph: `!` on error, `||` while playing, `▶` otherwise.
    pub fn glyph(&self) -> &'static str {
        match self.state {
            PlaybackState {
                has_error: true, ..
            } => "!",
            PlaybackState {
                is_playing: true, ..
            } => "||",
            _ => "▶",
        }
    }

    /// Bar heights in `[0.2, 1.0]`, only while playing.
    pub fn visualizer(&self, now_ms: u64) -> Option<[f64; BAR_COUNT]> {
        let since = self.playing_since_ms?;
        let t = now_ms.saturating_sub(since) as f64 / 1000.0;
        Some(std::array::from_fn(|i| bar_height(t - i as f64 * BAR_STAGGER_SECS)))
    }
}

/// 20% → 100% → 20% over one cycle, eased.
fn bar_height(t: f64) -> f64 {
    let p = t.rem_euclid(BAR_CYCLE_SECS) / BAR_CYCLE_SECS;
    let up = 1.0 - (2.0 * p - 1.0).abs();
    0.2 + 0.8 * Ease::InOutQuad.apply(up)
}

/// Stand-in used when the crate is built without audio output.
#[derive(Debug, Default)]
pub struct UnavailableBackend;

impl AudioBackend for UnavailableBackend {
    fn play(&mut self) -> CyberfolioResult<()> {
        Err(CyberfolioError::audio(
            "audio output not available (built without the `audio` feature)",
        ))
    }

    fn pause(&mut self) {}
}

/// Backend for the track at `path`: real output with the `audio` feature, otherwise one
/// that reports itself unavailable.
pub fn default_backend(path: &std::path::Path) -> Box<dyn AudioBackend> {
    #[cfg(feature = "audio")]
    {
        Box::new(RodioBackend::new(path))
    }
    #[cfg(not(feature = "audio"))]
    {
        tracing::debug!(path = %path.display(), "built without audio output");
        Box::new(UnavailableBackend)
    }
}

#[cfg(feature = "audio")]
pub use self::rodio_backend::RodioBackend;

#[cfg(feature = "audio")]
mod rodio_backend {
    use super::AudioBackend;
    use crate::foundation::error::{CyberfolioError, CyberfolioResult};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::{fs::File, io::BufReader, path::PathBuf};

    /// Loops a file on the default output device.
    pub struct RodioBackend {
        path: PathBuf,
        output: Option<(OutputStream, OutputStreamHandle)>,
        sink: Option<Sink>,
    }

    impl RodioBackend {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                output: None,
                sink: None,
            }
        }
    }

    impl AudioBackend for RodioBackend {
        fn play(&mut self) -> CyberfolioResult<()> {
            if let Some(sink) = &self.sink {
                sink.play();
                return Ok(());
            }

            let file = File::open(&self.path).map_err(|e| {
                CyberfolioError::audio(format!("open '{}': {e}", self.path.display()))
            })?;
            let source = Decoder::new(BufReader::new(file)).map_err(|e| {
                CyberfolioError::audio(format!("decode '{}': {e}", self.path.display()))
            })?;
            if self.output.is_none() {
                let output = OutputStream::try_default()
                    .map_err(|e| CyberfolioError::audio(format!("no output device: {e}")))?;
                self.output = Some(output);
            }
            let Some((_, handle)) = &self.output else {
                return Err(CyberfolioError::audio("no output device"));
            };
            let sink = Sink::try_new(handle)
                .map_err(|e| CyberfolioError::audio(format!("open sink: {e}")))?;
            sink.append(source.repeat_infinite());
            self.sink = Some(sink);
            tracing::debug!(path = %self.path.display(), "audio started");
            Ok(())
        }

        fn pause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
        }
    }
}
