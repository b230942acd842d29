//! Y4M (YUV4MPEG2) format support
//!
//! Y4M is an uncompressed planar YUV container, commonly used for raw video
//! testing and as the interchange format of encoders and decoders.

pub mod source;

pub use source::Y4mSource;
