//! Dense motion fields and their visualization
//!
//! This module holds the flow field produced by a motion estimator, the
//! estimators themselves, and the renderer that turns a field into a
//! color-wheel image.
//!
//! ## Motion Representation
//!
//! A [`FlowField`] stores one displacement (dx, dy) per pixel in two
//! parallel planes indexed `[row, col]`. Positive dx is motion to the right,
//! positive dy is motion downward.
//!
//! Estimators may mark low-confidence pixels with NaN or huge components.
//! Such vectors are invalid: they are excluded from normalization and left
//! as background when rendering.

pub mod estimator;
pub mod render;

pub use estimator::{BlockMatchConfig, BlockMatchEstimator, FlowEstimator};
pub use render::{map_to_color, FlowImage, FlowRenderer, Pixel, RenderConfig};

use crate::error::{Error, Result};
use ndarray::{Array2, Zip};

/// Components at or beyond this magnitude mark a vector as invalid
pub const MAX_FLOW_COMPONENT: f32 = 1e9;

/// Whether a motion vector may take part in normalization and rendering
#[inline]
pub fn is_flow_correct(dx: f32, dy: f32) -> bool {
    !dx.is_nan() && !dy.is_nan() && dx.abs() < MAX_FLOW_COMPONENT && dy.abs() < MAX_FLOW_COMPONENT
}

/// Dense optical flow with one (dx, dy) displacement per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    dx: Array2<f32>,
    dy: Array2<f32>,
}

impl FlowField {
    /// Create a zero flow field (no motion)
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            dx: Array2::zeros((height, width)),
            dy: Array2::zeros((height, width)),
        }
    }

    /// Create a field where every vector is invalid
    pub fn invalid(height: usize, width: usize) -> Self {
        Self {
            dx: Array2::from_elem((height, width), f32::NAN),
            dy: Array2::from_elem((height, width), f32::NAN),
        }
    }

    /// Create a flow field from its two component planes
    pub fn from_planes(dx: Array2<f32>, dy: Array2<f32>) -> Result<Self> {
        if dx.dim() != dy.dim() {
            return Err(Error::invalid_input(format!(
                "flow planes differ in shape: {:?} vs {:?}",
                dx.dim(),
                dy.dim()
            )));
        }
        Ok(Self { dx, dy })
    }

    /// Create a flow field from an interleaved two-channel buffer
    ///
    /// `data` holds `[dx, dy]` pairs in row-major order.
    pub fn from_interleaved(height: usize, width: usize, data: &[f32]) -> Result<Self> {
        if data.len() != height * width * 2 {
            return Err(Error::invalid_input(format!(
                "two-channel flow buffer of {}x{} needs {} values, got {}",
                width,
                height,
                height * width * 2,
                data.len()
            )));
        }

        let dx = Array2::from_shape_fn((height, width), |(r, c)| data[(r * width + c) * 2]);
        let dy = Array2::from_shape_fn((height, width), |(r, c)| data[(r * width + c) * 2 + 1]);
        Ok(Self { dx, dy })
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.dx.nrows()
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.dx.ncols()
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }

    /// Horizontal component plane
    pub fn dx(&self) -> &Array2<f32> {
        &self.dx
    }

    /// Vertical component plane
    pub fn dy(&self) -> &Array2<f32> {
        &self.dy
    }

    /// Motion vector at a position
    pub fn get(&self, row: usize, col: usize) -> Option<(f32, f32)> {
        Some((*self.dx.get((row, col))?, *self.dy.get((row, col))?))
    }

    /// Set the motion vector at a position; out-of-range positions are ignored
    pub fn set(&mut self, row: usize, col: usize, dx: f32, dy: f32) {
        if row < self.height() && col < self.width() {
            self.dx[[row, col]] = dx;
            self.dy[[row, col]] = dy;
        }
    }

    /// Number of valid vectors
    pub fn valid_count(&self) -> usize {
        let mut count = 0;
        Zip::from(&self.dx).and(&self.dy).for_each(|&dx, &dy| {
            if is_flow_correct(dx, dy) {
                count += 1;
            }
        });
        count
    }

    /// Largest magnitude among valid vectors, 0 for a field without any
    pub fn max_valid_magnitude(&self) -> f32 {
        let mut max = 0.0f32;
        Zip::from(&self.dx).and(&self.dy).for_each(|&dx, &dy| {
            if is_flow_correct(dx, dy) {
                max = max.max((dx * dx + dy * dy).sqrt());
            }
        });
        max
    }
}
