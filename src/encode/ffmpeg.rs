use crate::{
    encode::sink::{AudioTrack, FrameSink, SinkConfig},
    foundation::{
        color::Color,
        core::FrameIndex,
        error::{CyberfolioError, CyberfolioResult},
    },
    render::frame::FrameRGBA,
};
use std::{
    ffi::OsString,
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// What transparent pixels are flattened onto. ffmpeg gets opaque frames only.
    pub background: Color,
    /// x264 constant rate factor (0 lossless, 51 worst).
    pub crf: u8,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Color::BLACK,
            crf: 18,
        }
    }
}

/// Reject configs ffmpeg would choke on before a process is spawned.
fn check(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> CyberfolioResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(CyberfolioError::validation("fps must be non-zero"));
    }
    if cfg.width == 0
        || cfg.height == 0
        || !cfg.width.is_multiple_of(2)
        || !cfg.height.is_multiple_of(2)
    {
        return Err(CyberfolioError::validation(format!(
            "mp4 output needs a non-zero even size (yuv420p), got {}x{}",
            cfg.width, cfg.height
        )));
    }
    if opts.crf > 51 {
        return Err(CyberfolioError::validation("crf must be in 0..=51"));
    }
    if !opts.overwrite && opts.out_path.exists() {
        return Err(CyberfolioError::validation(format!(
            "output file '{}' already exists",
            opts.out_path.display()
        )));
    }
    if let Some(track) = &cfg.audio
        && !track.path.is_file()
    {
        return Err(CyberfolioError::validation(format!(
            "soundtrack '{}' does not exist",
            track.path.display()
        )));
    }
    Ok(())
}

fn push_all(args: &mut Vec<OsString>, items: &[&str]) {
    args.extend(items.iter().map(OsString::from));
}

/// Command line for one intro encode: raw RGBA on stdin as input 0 and the optional
/// soundtrack as input 1.
///
/// A looped soundtrack repeats until the last frame and `-shortest` cuts it there. A
/// one-shot soundtrack ends where it ends; the video keeps its full length.
pub fn encode_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<OsString> {
    let mut args = Vec::new();
    push_all(
        &mut args,
        &[if opts.overwrite { "-y" } else { "-n" }, "-loglevel", "error"],
    );

    let size = format!("{}x{}", cfg.width, cfg.height);
    let rate = format!("{}/{}", cfg.fps.num, cfg.fps.den);
    push_all(
        &mut args,
        &[
            "-f", "rawvideo", "-pix_fmt", "rgba", "-video_size", &size, "-framerate", &rate,
            "-i", "pipe:0",
        ],
    );

    match &cfg.audio {
        Some(AudioTrack { path, looped }) => {
            if *looped {
                push_all(&mut args, &["-stream_loop", "-1"]);
            }
            push_all(&mut args, &["-i"]);
            args.push(path.clone().into_os_string());
            push_all(&mut args, &["-map", "0:v:0", "-map", "1:a:0", "-c:a", "aac"]);
            if *looped {
                push_all(&mut args, &["-shortest"]);
            }
        }
        None => push_all(&mut args, &["-an"]),
    }

    let crf = opts.crf.to_string();
    push_all(
        &mut args,
        &[
            "-c:v", "libx264", "-crf", &crf, "-pix_fmt", "yuv420p", "-movflags", "+faststart",
        ],
    );
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// A running ffmpeg process.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<Vec<u8>>,
    width: u32,
    height: u32,
    opaque: Vec<u8>,
    last: Option<FrameIndex>,
}

/// Spawns the system `ffmpeg` and streams opaque RGBA frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> CyberfolioResult<()> {
        check(&self.opts, &cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(CyberfolioError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(encode_args(&self.opts, &cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CyberfolioError::encode(format!("spawn ffmpeg: {e}")))?;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            return Err(CyberfolioError::encode("ffmpeg pipes were not opened"));
        };
        // ffmpeg blocks once its stderr pipe fills up, so keep it drained.
        let stderr = std::thread::spawn(move || {
            let mut out = Vec::new();
            let _ = stderr.read_to_end(&mut out);
            out
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            soundtrack = cfg.audio.is_some(),
            "ffmpeg started"
        );
        self.encoder = Some(Encoder {
            child,
            stdin,
            stderr,
            width: cfg.width,
            height: cfg.height,
            opaque: vec![0; cfg.width as usize * cfg.height as usize * 4],
            last: None,
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> CyberfolioResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| CyberfolioError::encode("ffmpeg sink not started"))?;
        if enc.last.is_some_and(|last| idx <= last) {
            return Err(CyberfolioError::encode(format!(
                "frame {} arrived out of order",
                idx.0
            )));
        }
        if (frame.width, frame.height) != (enc.width, enc.height)
            || frame.data.len() != enc.opaque.len()
        {
            return Err(CyberfolioError::validation(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, enc.width, enc.height
            )));
        }

        for (dst, src) in enc
            .opaque
            .chunks_exact_mut(4)
            .zip(frame.data.chunks_exact(4))
        {
            dst.copy_from_slice(&over_background(src, self.opts.background));
        }
        enc.stdin
            .write_all(&enc.opaque)
            .map_err(|e| CyberfolioError::encode(format!("write frame {}: {e}", idx.0)))?;
        enc.last = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> CyberfolioResult<()> {
        let Encoder {
            mut child,
            stdin,
            stderr,
            ..
        } = self
            .encoder
            .take()
            .ok_or_else(|| CyberfolioError::encode("ffmpeg sink not started"))?;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| CyberfolioError::encode(format!("wait for ffmpeg: {e}")))?;
        let log = stderr.join().unwrap_or_default();
        if !status.success() {
            return Err(CyberfolioError::encode(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg finished");
        Ok(())
    }
}

/// Premultiplied pixel composited over an opaque background.
fn over_background(px: &[u8], bg: Color) -> [u8; 4] {
    let inv = 255 - u32::from(px[3]);
    let mix = |c: u8, b: u8| {
        let under = (u32::from(b) * inv + 127) / 255;
        (u32::from(c) + under).min(255) as u8
    };
    [mix(px[0], bg.r), mix(px[1], bg.g), mix(px[2], bg.b), 255]
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> CyberfolioResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Fps;

    fn cfg(audio: Option<AudioTrack>) -> SinkConfig {
        SinkConfig {
            width: 1280,
            height: 720,
            fps: Fps::SIXTY,
            audio,
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn position(args: &[String], flag: &str) -> Option<usize> {
        args.iter().position(|a| a == flag)
    }

    #[test]
    fn silent_encode_drops_audio() {
        let args = strings(&encode_args(&FfmpegSinkOpts::new("out/intro.mp4"), &cfg(None)));
        assert!(args.contains(&"-an".to_owned()));
        assert!(!args.contains(&"-map".to_owned()));
        assert_eq!(args.last().map(String::as_str), Some("out/intro.mp4"));
        let size = position(&args, "-video_size").unwrap();
        assert_eq!(args[size + 1], "1280x720");
        let rate = position(&args, "-framerate").unwrap();
        assert_eq!(args[rate + 1], "60/1");
    }

    #[test]
    fn looped_soundtrack_repeats_until_the_video_ends() {
        let track = AudioTrack {
            path: PathBuf::from("audio/song.mp3"),
            looped: true,
        };
        let args = strings(&encode_args(&FfmpegSinkOpts::new("x.mp4"), &cfg(Some(track))));
        let lp = position(&args, "-stream_loop").unwrap();
        assert_eq!(args[lp + 1], "-1");
        // The loop flag applies to the soundtrack input, which comes after the pipe.
        assert!(position(&args, "pipe:0").unwrap() < lp);
        assert_eq!(args[lp + 2], "-i");
        assert_eq!(args[lp + 3], "audio/song.mp3");
        assert!(args.contains(&"-shortest".to_owned()));
        assert!(args.contains(&"1:a:0".to_owned()));
    }

    #[test]
    fn one_shot_soundtrack_keeps_the_full_video() {
        let track = AudioTrack {
            path: PathBuf::from("sting.wav"),
            looped: false,
        };
        let args = strings(&encode_args(&FfmpegSinkOpts::new("x.mp4"), &cfg(Some(track))));
        assert!(position(&args, "-stream_loop").is_none());
        assert!(position(&args, "-shortest").is_none());
        assert!(args.contains(&"sting.wav".to_owned()));
    }

    #[test]
    fn overwrite_and_crf_are_passed_through() {
        let mut opts = FfmpegSinkOpts::new("x.mp4");
        opts.overwrite = false;
        opts.crf = 23;
        let args = strings(&encode_args(&opts, &cfg(None)));
        assert_eq!(args[0], "-n");
        let crf = position(&args, "-crf").unwrap();
        assert_eq!(args[crf + 1], "23");
    }

    #[test]
    fn compositing_over_the_background() {
        let bg = Color::rgb(10, 20, 30);
        assert_eq!(over_background(&[0, 0, 0, 0], bg), [10, 20, 30, 255]);
        assert_eq!(over_background(&[1, 2, 3, 255], bg), [1, 2, 3, 255]);
        // Half-covered white over black.
        assert_eq!(
            over_background(&[128, 128, 128, 128], Color::BLACK),
            [128, 128, 128, 255]
        );
    }

    #[test]
    fn bad_configs_are_rejected_before_spawning() {
        let opts = FfmpegSinkOpts::new(std::env::temp_dir().join("cyberfolio-odd.mp4"));
        let odd = SinkConfig {
            width: 1921,
            ..cfg(None)
        };
        assert!(matches!(
            FfmpegSink::new(opts.clone()).begin(odd),
            Err(CyberfolioError::Validation(_))
        ));

        let missing = cfg(Some(AudioTrack {
            path: PathBuf::from("definitely/not/here.mp3"),
            looped: true,
        }));
        assert!(matches!(
            FfmpegSink::new(opts).begin(missing),
            Err(CyberfolioError::Validation(_))
        ));
    }

    #[test]
    fn frames_before_begin_are_an_error() {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("x.mp4"));
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 16],
            premultiplied: true,
        };
        assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
        assert!(sink.end().is_err());
    }
}
