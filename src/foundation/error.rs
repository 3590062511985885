/// Result alias used across the crate.
pub type CyberfolioResult<T> = Result<T, CyberfolioError>;

/// Crate-wide error type.
///
/// Most of the runtime is infallible by construction (frame evaluation, layers, timers).
/// Errors surface at the edges: configuration loading, rasterization, encoding, and the
/// two soft external dependencies (contribution fetch, audio playback).
#[derive(thiserror::Error, Debug)]
pub enum CyberfolioError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid animation table or spring parameters.
    #[error("animation error: {0}")]
    Animation(String),

    /// Scene serialization or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink failure (ffmpeg, file output).
    #[error("encode error: {0}")]
    Encode(String),

    /// Contribution data could not be fetched or decoded.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Audio playback could not start.
    #[error("audio error: {0}")]
    Audio(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CyberfolioError {
    /// Build a [`CyberfolioError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CyberfolioError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`CyberfolioError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CyberfolioError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CyberfolioError::Fetch`].
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`CyberfolioError::Audio`].
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`CyberfolioError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for CyberfolioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
