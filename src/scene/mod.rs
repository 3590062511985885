pub(crate) mod config;
pub(crate) mod palette;
pub(crate) mod timeline;
pub(crate) mod timing;
