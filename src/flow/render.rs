//! Flow field rendering
//!
//! Direction is encoded as hue on the [`ColorWheel`], magnitude as
//! saturation: a zero vector is white, a vector of normalized length 1 is
//! the pure wheel color, and anything longer is darkened to flag that it
//! lies outside the normalization range.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flowviz_lib::flow::{FlowRenderer, RenderConfig};
//! use flowviz_lib::util::ColorWheel;
//!
//! let wheel = ColorWheel::new();
//! let renderer = FlowRenderer::new(&wheel, RenderConfig::transparent());
//! let image = renderer.render(&field);
//! ```

use super::{is_flow_correct, FlowField};
use crate::error::{Error, Result};
use crate::util::colorwheel::{ColorWheel, NCOLS};
use crate::util::PixelFormat;
use image::{DynamicImage, RgbImage, RgbaImage};
use ndarray::Zip;
use std::f32::consts::PI;

/// Explicit normalization scale used when rendering video sequences
pub const DEFAULT_FLOW_SCALE: f32 = 10.0;

/// Darkening applied to out-of-range vectors by the transparent variant
pub const DARKEN_TRANSPARENT: f32 = 0.75;

/// Darkening applied to out-of-range vectors by the opaque variant
pub const DARKEN_OPAQUE: f32 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Rendering configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output pixel layout
    pub pixel_format: PixelFormat,
    /// Multiplier applied to colors of vectors longer than the scale
    pub out_of_range_darken: f32,
    /// Explicit normalization scale; `None` or a non-positive value derives
    /// it from the field
    pub scale: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::transparent()
    }
}

impl RenderConfig {
    /// RGBA output, pure black transparent, out-of-range darkened to 75%
    pub fn transparent() -> Self {
        Self {
            pixel_format: PixelFormat::RGBA,
            out_of_range_darken: DARKEN_TRANSPARENT,
            scale: Some(DEFAULT_FLOW_SCALE),
        }
    }

    /// RGB output, out-of-range darkened to 50%
    pub fn opaque() -> Self {
        Self {
            pixel_format: PixelFormat::RGB24,
            out_of_range_darken: DARKEN_OPAQUE,
            scale: Some(DEFAULT_FLOW_SCALE),
        }
    }

    /// Builder method: set pixel format
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Builder method: set out-of-range darkening factor
    pub fn with_darken(mut self, factor: f32) -> Self {
        self.out_of_range_darken = factor;
        self
    }

    /// Builder method: set explicit scale, `None` for data-derived
    pub fn with_scale(mut self, scale: Option<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Check the configuration for values that cannot produce an image
    pub fn validate(&self) -> Result<()> {
        if !self.out_of_range_darken.is_finite() || self.out_of_range_darken < 0.0 {
            return Err(Error::config(format!(
                "out-of-range darkening factor must be finite and non-negative, got {}",
                self.out_of_range_darken
            )));
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() {
                return Err(Error::config(format!("flow scale must be finite, got {}", scale)));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pixels and images
// ─────────────────────────────────────────────────────────────────────────────

/// One rendered pixel, channels in R, G, B(, A) order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

impl Pixel {
    /// Channel bytes
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Pixel::Rgb(p) => p,
            Pixel::Rgba(p) => p,
        }
    }

    /// Color channels without alpha
    pub fn rgb(&self) -> [u8; 3] {
        match *self {
            Pixel::Rgb(p) => p,
            Pixel::Rgba([r, g, b, _]) => [r, g, b],
        }
    }
}

/// Rendered flow visualization
#[derive(Debug, Clone, PartialEq)]
pub enum FlowImage {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl FlowImage {
    /// All-zero image: black, and transparent when the format has alpha
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        match format {
            PixelFormat::RGB24 => FlowImage::Rgb(RgbImage::new(width, height)),
            PixelFormat::RGBA => FlowImage::Rgba(RgbaImage::new(width, height)),
        }
    }

    /// Pixel layout
    pub fn format(&self) -> PixelFormat {
        match self {
            FlowImage::Rgb(_) => PixelFormat::RGB24,
            FlowImage::Rgba(_) => PixelFormat::RGBA,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            FlowImage::Rgb(img) => img.width(),
            FlowImage::Rgba(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            FlowImage::Rgb(img) => img.height(),
            FlowImage::Rgba(img) => img.height(),
        }
    }

    /// Channel bytes of one pixel
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the image
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        match self {
            FlowImage::Rgb(img) => &img.get_pixel(x, y).0,
            FlowImage::Rgba(img) => &img.get_pixel(x, y).0,
        }
    }

    /// Write a pixel, converting between layouts if needed
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        match self {
            FlowImage::Rgb(img) => img.put_pixel(x, y, image::Rgb(pixel.rgb())),
            FlowImage::Rgba(img) => {
                let rgba = match pixel {
                    Pixel::Rgba(p) => p,
                    Pixel::Rgb([r, g, b]) => [r, g, b, 255],
                };
                img.put_pixel(x, y, image::Rgba(rgba));
            }
        }
    }

    /// Raw interleaved bytes
    pub fn as_raw(&self) -> &[u8] {
        match self {
            FlowImage::Rgb(img) => img.as_raw(),
            FlowImage::Rgba(img) => img.as_raw(),
        }
    }

    /// Convert into an `image` dynamic image for encoding
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            FlowImage::Rgb(img) => DynamicImage::ImageRgb8(img),
            FlowImage::Rgba(img) => DynamicImage::ImageRgba8(img),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Map one normalized motion vector to a pixel
///
/// `fx` and `fy` must already be divided by the normalization scale.
pub fn map_to_color(
    wheel: &ColorWheel,
    fx: f32,
    fy: f32,
    darken: f32,
    format: PixelFormat,
) -> Pixel {
    let rad = (fx * fx + fy * fy).sqrt();
    let a = (-fy).atan2(-fx) / PI;

    let fk = (a + 1.0) / 2.0 * (NCOLS - 1) as f32;
    let k0 = fk as usize;
    let k1 = (k0 + 1) % NCOLS;
    let f = fk - k0 as f32;

    let c0 = wheel.color_at(k0);
    let c1 = wheel.color_at(k1);

    let mut rgb = [0u8; 3];
    for (b, out) in rgb.iter_mut().enumerate() {
        let col0 = c0[b] as f32 / 255.0;
        let col1 = c1[b] as f32 / 255.0;

        let mut col = (1.0 - f) * col0 + f * col1;
        if rad <= 1.0 {
            // saturation grows with radius
            col = 1.0 - rad * (1.0 - col);
        } else {
            col *= darken;
        }

        *out = (255.0 * col) as u8;
    }

    match format {
        PixelFormat::RGB24 => Pixel::Rgb(rgb),
        PixelFormat::RGBA => {
            let alpha = if rgb == [0, 0, 0] { 0 } else { 255 };
            Pixel::Rgba([rgb[0], rgb[1], rgb[2], alpha])
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Renders flow fields into color-wheel images
#[derive(Debug, Clone)]
pub struct FlowRenderer<'w> {
    wheel: &'w ColorWheel,
    config: RenderConfig,
}

impl<'w> FlowRenderer<'w> {
    /// Create a renderer drawing from the given wheel
    pub fn new(wheel: &'w ColorWheel, config: RenderConfig) -> Self {
        Self { wheel, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Normalization scale used for a field
    ///
    /// A positive explicit scale wins; otherwise the largest valid magnitude,
    /// never below 1.
    pub fn max_radius(&self, field: &FlowField) -> f32 {
        match self.config.scale {
            Some(scale) if scale > 0.0 => scale,
            _ => field.max_valid_magnitude().max(1.0),
        }
    }

    /// Render a field; invalid vectors stay at the zero background
    pub fn render(&self, field: &FlowField) -> FlowImage {
        let (height, width) = field.dim();
        let mut image = FlowImage::new(self.config.pixel_format, width as u32, height as u32);
        let maxrad = self.max_radius(field);

        Zip::indexed(field.dx())
            .and(field.dy())
            .for_each(|(row, col), &dx, &dy| {
                if !is_flow_correct(dx, dy) {
                    return;
                }
                let pixel = map_to_color(
                    self.wheel,
                    dx / maxrad,
                    dy / maxrad,
                    self.config.out_of_range_darken,
                    self.config.pixel_format,
                );
                image.put_pixel(col as u32, row as u32, pixel);
            });

        image
    }
}

impl FlowRenderer<'static> {
    /// Create a renderer using the process-wide wheel
    pub fn with_shared_wheel(config: RenderConfig) -> Self {
        Self::new(ColorWheel::shared(), config)
    }
}
