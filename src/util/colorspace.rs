//! Color Space Conversion Utilities
//!
//! Conversions needed on the way from decoded video to motion estimation:
//!
//! - **YUV → RGB** for raw video containers that carry planar YCbCr
//! - **RGB → intensity** for the grayscale frames handed to the estimator
//!
//! All conversions use BT.601 luma weights (0.299 / 0.587 / 0.114).

use crate::error::{Error, Result};
use image::RgbImage;
use ndarray::Array2;

/// BT.601 red luma weight
pub const KR: f32 = 0.299;
/// BT.601 blue luma weight
pub const KB: f32 = 0.114;
/// BT.601 green luma weight
pub const KG: f32 = 1.0 - KR - KB;

/// Quantization range of YCbCr samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRange {
    /// Limited range (16-235 for Y, 16-240 for Cb/Cr)
    #[default]
    Limited,
    /// Full range (0-255 for all)
    Full,
}

/// Chroma plane subsampling factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromaSubsampling {
    /// Horizontal factor (2 for 4:2:0 and 4:2:2)
    pub horizontal: usize,
    /// Vertical factor (2 for 4:2:0)
    pub vertical: usize,
}

impl ChromaSubsampling {
    /// 4:2:0
    pub const YUV420: Self = Self {
        horizontal: 2,
        vertical: 2,
    };
    /// 4:2:2
    pub const YUV422: Self = Self {
        horizontal: 2,
        vertical: 1,
    };
    /// 4:4:4
    pub const YUV444: Self = Self {
        horizontal: 1,
        vertical: 1,
    };

    /// Chroma plane dimensions for a luma plane of the given size
    pub fn plane_size(&self, width: usize, height: usize) -> (usize, usize) {
        (
            width.div_ceil(self.horizontal),
            height.div_ceil(self.vertical),
        )
    }
}

/// BT.601 converter for decoded video frames
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter {
    range: ColorRange,
}

impl ColorConverter {
    /// Create a converter for samples in the given range
    pub fn new(range: ColorRange) -> Self {
        ColorConverter { range }
    }

    /// Sample range this converter expects
    pub fn range(&self) -> ColorRange {
        self.range
    }

    /// One YCbCr sample to RGB
    pub fn ycbcr_to_rgb(&self, y: u8, cb: u8, cr: u8) -> [u8; 3] {
        let (y, cb, cr) = match self.range {
            ColorRange::Limited => (
                ((y as f32 - 16.0) * 255.0 / 219.0).clamp(0.0, 255.0),
                ((cb as f32 - 128.0) * 255.0 / 224.0).clamp(-128.0, 127.0),
                ((cr as f32 - 128.0) * 255.0 / 224.0).clamp(-128.0, 127.0),
            ),
            ColorRange::Full => (y as f32, cb as f32 - 128.0, cr as f32 - 128.0),
        };

        let r = y + cr * 2.0 * (1.0 - KR);
        let g = y - cb * 2.0 * KB * (1.0 - KB) / KG - cr * 2.0 * KR * (1.0 - KR) / KG;
        let b = y + cb * 2.0 * (1.0 - KB);

        [
            r.round().clamp(0.0, 255.0) as u8,
            g.round().clamp(0.0, 255.0) as u8,
            b.round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Convert planar YUV to a packed RGB image
    ///
    /// `None` chroma planes are treated as neutral (mono sources).
    pub fn yuv_planes_to_rgb(
        &self,
        y_plane: &[u8],
        chroma: Option<(&[u8], &[u8])>,
        subsampling: ChromaSubsampling,
        width: usize,
        height: usize,
    ) -> Result<RgbImage> {
        if y_plane.len() < width * height {
            return Err(Error::invalid_input(format!(
                "Y plane size mismatch: expected {}, got {}",
                width * height,
                y_plane.len()
            )));
        }

        let (chroma_width, chroma_height) = subsampling.plane_size(width, height);
        if let Some((u_plane, v_plane)) = chroma {
            let expected = chroma_width * chroma_height;
            if u_plane.len() < expected || v_plane.len() < expected {
                return Err(Error::invalid_input(format!(
                    "chroma plane size mismatch: expected {}, got {}/{}",
                    expected,
                    u_plane.len(),
                    v_plane.len()
                )));
            }
        }

        let mut rgb_data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let (u, v) = match chroma {
                    Some((u_plane, v_plane)) => {
                        let idx = (y / subsampling.vertical) * chroma_width
                            + (x / subsampling.horizontal);
                        (u_plane[idx], v_plane[idx])
                    }
                    None => (128, 128),
                };
                rgb_data.extend_from_slice(&self.ycbcr_to_rgb(y_plane[y * width + x], u, v));
            }
        }

        RgbImage::from_raw(width as u32, height as u32, rgb_data)
            .ok_or_else(|| Error::invalid_input("RGB buffer does not match frame size"))
    }

    /// Grayscale intensity of an RGB image, normalized to [0, 1]
    ///
    /// The result is indexed `[row, col]`.
    pub fn intensity(&self, image: &RgbImage) -> Array2<f32> {
        let (width, height) = image.dimensions();

        Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            let px = image.get_pixel(col as u32, row as u32);
            let luma = KR * px[0] as f32 + KG * px[1] as f32 + KB * px[2] as f32;
            (luma / 255.0).clamp(0.0, 1.0)
        })
    }
}
