//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and are driven by
//! `IntroRenderer::render_range`.

/// `ffmpeg`-based MP4 output.
pub mod ffmpeg;
/// Frame sink trait and the in-memory / PNG sequence sinks.
pub mod sink;
