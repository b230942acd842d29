//! Common utilities and data structures

pub mod colorspace;
pub mod colorwheel;
pub mod pixfmt;

pub use colorspace::{ChromaSubsampling, ColorConverter, ColorRange};
pub use colorwheel::ColorWheel;
pub use pixfmt::PixelFormat;
