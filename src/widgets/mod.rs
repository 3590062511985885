//! Small landing-page widgets: contribution grid, music toggle and skill marquee.

pub(crate) mod audio;
pub(crate) mod contributions;
pub(crate) mod marquee;
