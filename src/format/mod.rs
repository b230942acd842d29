//! Frame sources and image output
//!
//! Video is consumed through the [`VideoSource`] trait, which delivers
//! decoded color frames one at a time. Two containers are supported:
//!
//! - **Y4M** (YUV4MPEG2) raw video files
//! - **Image sequences**: a directory of still images read in name order
//!
//! Rendered flow images leave through an [`ImageWriter`].

pub mod image_seq;
pub mod writer;
pub mod y4m;

pub use self::image_seq::ImageSequenceSource;
pub use self::writer::{frame_output_path, FileImageWriter, ImageWriter, OutputFormat};
pub use self::y4m::Y4mSource;

use crate::error::{Error, Result};
use image::RgbImage;
use std::path::Path;

/// Sequential source of decoded color frames
pub trait VideoSource {
    /// Short container name for logging
    fn format_name(&self) -> &str;

    /// Number of frames the source declares
    fn frame_count(&self) -> usize;

    /// Frame dimensions (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Read the next frame, `None` once the source is exhausted
    fn read_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Detect a container from a file extension
pub fn detect_format_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "y4m" => Some("y4m"),
        _ => None,
    }
}

/// Open a frame source for a path
///
/// Directories are read as image sequences; files are matched by extension.
/// Every failure is reported as [`Error::SourceOpen`].
pub fn open_source(path: &Path) -> Result<Box<dyn VideoSource>> {
    let opened: Result<Box<dyn VideoSource>> = if path.is_dir() {
        ImageSequenceSource::open(path).map(|s| Box::new(s) as Box<dyn VideoSource>)
    } else {
        match detect_format_from_extension(path) {
            Some("y4m") => Y4mSource::open(path).map(|s| Box::new(s) as Box<dyn VideoSource>),
            _ => Err(Error::unsupported(format!(
                "no frame source for '{}'",
                path.display()
            ))),
        }
    };

    opened.map_err(|e| match e {
        Error::SourceOpen(_) => e,
        other => Error::source_open(format!("{}: {}", path.display(), other)),
    })
}
