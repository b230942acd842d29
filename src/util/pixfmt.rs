//! Pixel format definitions

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Pixel layout of a rendered flow image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// RGB24 - 8 bits per component, packed
    RGB24,
    /// RGBA - RGB with alpha channel; pure black pixels are transparent
    #[default]
    RGBA,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::RGB24 => "rgb24",
            PixelFormat::RGBA => "rgba",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" | "rgb24" => Ok(PixelFormat::RGB24),
            "rgba" => Ok(PixelFormat::RGBA),
            other => Err(Error::config(format!("unknown pixel format '{}'", other))),
        }
    }
}
