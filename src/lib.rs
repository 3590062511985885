//! Cyberfolio is a cyberpunk portfolio landing page as a library.
//!
//! The crate has three layers:
//!
//! - The intro: a deterministic, frame-indexed animation rendered through a display list
//!   into SVG, pixels and MP4 ([`IntroRenderer`])
//! - The page: a single-threaded event loop that hands off from the intro to the content
//!   through timed phases and drives the scroll static effect ([`Page`])
//! - The widgets: ASCII sphere, contribution grid, music toggle and skill marquee
#![forbid(unsafe_code)]

pub(crate) mod animation;
/// Site text and asset references.
pub mod content;
/// Encoding sinks.
pub mod encode;
pub(crate) mod foundation;
pub(crate) mod layers;
pub(crate) mod page;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod sphere;
pub(crate) mod widgets;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
pub use crate::foundation::error::{CyberfolioError, CyberfolioResult};
pub use crate::foundation::math::FrameRng;

pub use crate::animation::clock::AnimationClock;
pub use crate::animation::ease::Ease;
pub use crate::animation::interpolate::{Extrapolate, InterpOpts, Interpolator, interpolate, remap};
pub use crate::animation::spring::{SpringConfig, spring, step_response};

pub use crate::scene::config::{IntroConfig, TitleConfig};
pub use crate::scene::palette::Palette;
pub use crate::scene::timeline::{FrameCtx, Timeline};
pub use crate::scene::timing::{IntroTiming, StutterRates};

pub use crate::layers::{Layer, LayerStack};
pub use crate::render::display::{DrawItem, LayerOutput, Scene, Shape, ZBand};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::session::{FontOptions, IntroRenderer, RenderStats};
pub use crate::render::svg::scene_to_svg;

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioTrack, FrameSink, InMemorySink, PngSequenceSink, SinkConfig};

pub use crate::page::phase::{
    PageTiming, PhaseController, PhaseFlags, PhaseTrigger, TransitionPhase,
};
pub use crate::page::scroll::ScrollStatic;
pub use crate::page::session::{Page, PageConfig, PageEvent, PageEventKind, PageView};
pub use crate::page::timers::{Clock, ManualClock, SystemClock, TimerEvent, TimerId, TimerQueue};

pub use crate::sphere::ascii::{AsciiEffect, CHARSET};
pub use crate::sphere::host::{PointerEvent, WidgetHost};
pub use crate::sphere::widget::{
    AsciiFrame, FRAME_INTERVAL_MS, MountedSphere, SphereProps, SphereScene, SphereSlot,
};

pub use crate::widgets::audio::{
    AudioBackend, AudioToggle, ERROR_LABEL, PlaybackState, UnavailableBackend, default_backend,
};
#[cfg(feature = "audio")]
pub use crate::widgets::audio::RodioBackend;
pub use crate::widgets::contributions::{
    ContributionData, ContributionDay, ContributionSource, ContributionsWidget, FetchState,
    HttpContributionSource, current_streak, parse_response,
};
pub use crate::widgets::marquee::{HttpIconFetcher, IconFetcher, IconSet, Marquee, Skill};

pub use crate::content::{ExperienceEntry, SiteContent};
