//! Image sequence source
//!
//! Treats a directory of still images as a video, one frame per file in
//! lexicographic file-name order (`frame_0001.png`, `frame_0002.png`, ...).

use crate::error::{Error, Result};
use crate::format::VideoSource;
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions read as frames
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Frames decoded from the images of a directory
#[derive(Debug)]
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    dimensions: (u32, u32),
    next: usize,
}

impl ImageSequenceSource {
    /// Open a directory of images
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .map_err(|e| Error::source_open(format!("{}: {}", dir.display(), e)))?;

        let mut frames = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_frame_file(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        let dimensions = match frames.first() {
            Some(first) => image::image_dimensions(first)?,
            None => (0, 0),
        };

        debug!(
            "opened image sequence {}: {} frames of {}x{}",
            dir.display(),
            frames.len(),
            dimensions.0,
            dimensions.1
        );

        Ok(ImageSequenceSource {
            frames,
            dimensions,
            next: 0,
        })
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl VideoSource for ImageSequenceSource {
    fn format_name(&self) -> &str {
        "image2"
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };

        let frame = image::open(path)?.to_rgb8();
        self.next += 1;
        Ok(Some(frame))
    }
}
