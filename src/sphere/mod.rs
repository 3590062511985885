//! Decorative ASCII sphere: a tiny flat-shaded 3D scene rendered on the CPU and turned into
//! a character grid, attached to a [`host::WidgetHost`] for its frame loop and input.

pub(crate) mod ascii;
pub(crate) mod host;
pub(crate) mod mesh;
pub(crate) mod orbit;
pub(crate) mod raster;
pub(crate) mod widget;
