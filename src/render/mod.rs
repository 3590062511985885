//! Display list, SVG serialization, rasterization and the frame renderer.

pub(crate) mod display;
pub(crate) mod frame;
pub(crate) mod raster;
pub(crate) mod session;
pub(crate) mod svg;
