//! Image output
//!
//! Rendered flow images are written one file per frame transition, named by
//! a zero-padded frame index so that the output directory sorts in frame
//! order.

use crate::error::{Error, Result};
use crate::flow::FlowImage;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Destination for rendered images
pub trait ImageWriter {
    /// Write one image to a path
    fn write(&mut self, path: &Path, image: &FlowImage) -> Result<()>;
}

/// Encoded output format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JPEG; the alpha channel is dropped
    #[default]
    Jpeg,
    /// PNG; keeps alpha
    Png,
    /// BMP; keeps alpha
    Bmp,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
        }
    }

    /// Detect the format of an output path
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::invalid_input(format!("no extension on '{}'", path.display())))?
            .parse()
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            other => Err(Error::unsupported(format!("output format '{}'", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Output path of a frame: `<dir>/<index:05>.<ext>`
pub fn frame_output_path(dir: &Path, index: usize, format: OutputFormat) -> PathBuf {
    dir.join(format!("{:05}.{}", index, format.extension()))
}

/// Writes images to the filesystem with the `image` encoders
#[derive(Debug, Clone)]
pub struct FileImageWriter {
    jpeg_quality: u8,
}

impl FileImageWriter {
    /// Create a writer with the given JPEG quality (1-100)
    pub fn new(jpeg_quality: u8) -> Result<Self> {
        if !(1..=100).contains(&jpeg_quality) {
            return Err(Error::config(format!(
                "JPEG quality must be within 1-100, got {}",
                jpeg_quality
            )));
        }
        Ok(Self { jpeg_quality })
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn encode_jpeg(&self, image: &FlowImage) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);

        match image {
            FlowImage::Rgb(img) => encoder.encode_image(img)?,
            FlowImage::Rgba(img) => {
                let rgb = RgbImage::from_fn(img.width(), img.height(), |x, y| {
                    let [r, g, b, _] = img.get_pixel(x, y).0;
                    image::Rgb([r, g, b])
                });
                encoder.encode_image(&rgb)?
            }
        }
        Ok(buf)
    }

    fn encode_lossless(image: &FlowImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        match image {
            FlowImage::Rgb(img) => img.write_to(&mut cursor, format)?,
            FlowImage::Rgba(img) => img.write_to(&mut cursor, format)?,
        }
        Ok(cursor.into_inner())
    }
}

impl Default for FileImageWriter {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageWriter for FileImageWriter {
    /// Encode in memory, then write the whole file so that short writes
    /// surface as [`Error::Io`]
    fn write(&mut self, path: &Path, image: &FlowImage) -> Result<()> {
        let encoded = match OutputFormat::from_path(path)? {
            OutputFormat::Jpeg => self.encode_jpeg(image)?,
            OutputFormat::Png => Self::encode_lossless(image, ImageFormat::Png)?,
            OutputFormat::Bmp => Self::encode_lossless(image, ImageFormat::Bmp)?,
        };
        fs::write(path, encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Pixel;
    use crate::util::PixelFormat;
    use tempfile::TempDir;

    #[test]
    fn test_frame_output_path() {
        let path = frame_output_path(Path::new("out"), 7, OutputFormat::Jpeg);
        assert_eq!(path, PathBuf::from("out/00007.jpg"));
        let path = frame_output_path(Path::new("out"), 123456, OutputFormat::Png);
        assert_eq!(path, PathBuf::from("out/123456.png"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(
            OutputFormat::from_path(Path::new("a/b.png")).unwrap(),
            OutputFormat::Png
        );
        assert!(OutputFormat::from_path(Path::new("a/b")).is_err());
        assert!("tiff".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_rejects_bad_quality() {
        assert!(FileImageWriter::new(0).is_err());
        assert!(FileImageWriter::new(101).is_err());
        assert_eq!(FileImageWriter::new(80).unwrap().jpeg_quality(), 80);
    }

    #[test]
    fn test_png_keeps_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("00001.png");

        let mut image = FlowImage::new(PixelFormat::RGBA, 2, 1);
        image.put_pixel(1, 0, Pixel::Rgba([10, 20, 30, 255]));
        FileImageWriter::default().write(&path, &image).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("00001.jpg");

        let image = FlowImage::new(PixelFormat::RGBA, 8, 8);
        FileImageWriter::default().write(&path, &image).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
        assert!(!decoded.color().has_alpha());
    }

    #[cfg(unix)]
    #[test]
    fn test_full_disk_is_an_io_error() {
        let dev_full = Path::new("/dev/full");
        if !dev_full.exists() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let image = FlowImage::new(PixelFormat::RGBA, 8, 8);

        for name in ["00001.jpg", "00001.png", "00001.bmp"] {
            let path = dir.path().join(name);
            std::os::unix::fs::symlink(dev_full, &path).unwrap();
            let result = FileImageWriter::default().write(&path, &image);
            assert!(matches!(result, Err(Error::Io(_))), "{} reported {:?}", name, result);
        }
    }
}
