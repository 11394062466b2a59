//! Library side of the `vts` binary: settings, logging and output rendering.

pub mod config;
pub mod logging;
pub mod render;
