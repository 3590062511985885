//! The landing page: intro hand-off, phase timers and scroll feedback.

pub(crate) mod intro;
pub(crate) mod phase;
pub(crate) mod scroll;
pub(crate) mod session;
pub(crate) mod timers;
