//! Motion estimation
//!
//! The renderer only depends on the [`FlowEstimator`] contract: two
//! same-sized intensity frames in [0, 1] go in, a dense [`FlowField`] of the
//! same size comes out. Any estimator may report low-confidence pixels as
//! NaN vectors.
//!
//! [`BlockMatchEstimator`] is the built-in implementation. It performs
//! exhaustive Sum of Absolute Differences (SAD) block matching, searching
//! block rows in parallel with rayon, and assigns each block's vector to all
//! of its pixels.

use super::FlowField;
use crate::error::{Error, Result};
use ndarray::{s, Array2, ArrayView2, Zip};
use rayon::prelude::*;
use tracing::debug;

/// Default block size for block matching
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Default motion search range in pixels
pub const DEFAULT_SEARCH_RANGE: usize = 8;

/// Minimum block size
pub const MIN_BLOCK_SIZE: usize = 2;

/// Penalty per pixel of displacement, prefers short vectors on ties
const MOTION_LAMBDA: f32 = 0.01;

/// Produces a dense flow field from a pair of intensity frames
pub trait FlowEstimator {
    /// Estimate displacement from `previous` to `current`
    ///
    /// Both frames are indexed `[row, col]` and hold intensities in [0, 1].
    fn estimate(&mut self, previous: &Array2<f32>, current: &Array2<f32>) -> Result<FlowField>;

    /// Short name for logging
    fn name(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Matching Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for block matching
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMatchConfig {
    /// Block edge length in pixels (default 8)
    pub block_size: usize,
    /// Maximum displacement searched in each direction (default 8)
    pub search_range: usize,
    /// Blocks whose best mean absolute difference exceeds this are reported
    /// as invalid vectors
    pub confidence_threshold: Option<f32>,
}

impl Default for BlockMatchConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            search_range: DEFAULT_SEARCH_RANGE,
            confidence_threshold: None,
        }
    }
}

impl BlockMatchConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration optimized for speed
    pub fn fast() -> Self {
        Self {
            block_size: 16,
            search_range: 4,
            confidence_threshold: None,
        }
    }

    /// Create configuration optimized for quality
    pub fn quality() -> Self {
        Self {
            block_size: 4,
            search_range: 16,
            confidence_threshold: None,
        }
    }

    /// Builder method: set block size
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Builder method: set search range
    pub fn with_search_range(mut self, range: usize) -> Self {
        self.search_range = range;
        self
    }

    /// Builder method: set confidence threshold
    pub fn with_confidence_threshold(mut self, threshold: Option<f32>) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Check the configuration
    pub fn validate(&self) -> Result<()> {
        if self.block_size < MIN_BLOCK_SIZE {
            return Err(Error::config(format!(
                "block size must be at least {}, got {}",
                MIN_BLOCK_SIZE, self.block_size
            )));
        }
        if let Some(threshold) = self.confidence_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(Error::config(format!(
                    "confidence threshold must be finite and non-negative, got {}",
                    threshold
                )));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Matching Estimator
// ─────────────────────────────────────────────────────────────────────────────

/// Dense flow by exhaustive block matching
#[derive(Debug, Clone, Default)]
pub struct BlockMatchEstimator {
    config: BlockMatchConfig,
}

impl BlockMatchEstimator {
    /// Create an estimator, rejecting unusable configurations
    pub fn new(config: BlockMatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the configuration
    pub fn config(&self) -> &BlockMatchConfig {
        &self.config
    }
}

impl FlowEstimator for BlockMatchEstimator {
    fn estimate(&mut self, previous: &Array2<f32>, current: &Array2<f32>) -> Result<FlowField> {
        if previous.dim() != current.dim() {
            return Err(Error::invalid_input(format!(
                "frame sizes differ: {:?} vs {:?}",
                previous.dim(),
                current.dim()
            )));
        }

        let (height, width) = previous.dim();
        let config = &self.config;
        let block_size = config.block_size;
        let blocks_y = height.div_ceil(block_size);
        let blocks_x = width.div_ceil(block_size);

        let vectors: Vec<Vec<(f32, f32)>> = (0..blocks_y)
            .into_par_iter()
            .map(|by| {
                (0..blocks_x)
                    .map(|bx| {
                        let m = search_best_match(
                            previous,
                            current,
                            by * block_size,
                            bx * block_size,
                            block_size,
                            config.search_range,
                        );
                        match config.confidence_threshold {
                            Some(threshold) if m.mean_abs_diff > threshold => (f32::NAN, f32::NAN),
                            _ => (m.dx as f32, m.dy as f32),
                        }
                    })
                    .collect()
            })
            .collect();

        let mut field = FlowField::zeros(height, width);
        for (by, row) in vectors.iter().enumerate() {
            for (bx, &(dx, dy)) in row.iter().enumerate() {
                let y_end = ((by + 1) * block_size).min(height);
                let x_end = ((bx + 1) * block_size).min(width);
                for y in by * block_size..y_end {
                    for x in bx * block_size..x_end {
                        field.set(y, x, dx, dy);
                    }
                }
            }
        }

        debug!(
            "block matching {}x{} frame: {} blocks, {} valid pixels",
            width,
            height,
            blocks_x * blocks_y,
            field.valid_count()
        );

        Ok(field)
    }

    fn name(&self) -> &str {
        "block-match"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Matching Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Best displacement found for one block
#[derive(Debug, Clone, Copy, PartialEq)]
struct BlockMatch {
    dx: i32,
    dy: i32,
    mean_abs_diff: f32,
}

/// Search `current` for the block of `previous` at (block_y, block_x)
///
/// Uses a small motion penalty so that zero motion wins over equally good
/// distant matches in uniform regions.
fn search_best_match(
    previous: &Array2<f32>,
    current: &Array2<f32>,
    block_y: usize,
    block_x: usize,
    block_size: usize,
    search_range: usize,
) -> BlockMatch {
    let (height, width) = previous.dim();

    let by_end = (block_y + block_size).min(height);
    let bx_end = (block_x + block_size).min(width);
    let block_h = by_end - block_y;
    let block_w = bx_end - block_x;

    let block = previous.slice(s![block_y..by_end, block_x..bx_end]);
    let search_range = search_range as i32;

    let mut best = BlockMatch {
        dx: 0,
        dy: 0,
        mean_abs_diff: f32::MAX,
    };
    let mut best_cost = f32::MAX;

    for dy in -search_range..=search_range {
        for dx in -search_range..=search_range {
            let ref_y = block_y as i32 + dy;
            let ref_x = block_x as i32 + dx;
            if ref_y < 0 || ref_x < 0 {
                continue;
            }

            let ref_y = ref_y as usize;
            let ref_x = ref_x as usize;
            if ref_y + block_h > height || ref_x + block_w > width {
                continue;
            }

            let candidate = current.slice(s![ref_y..ref_y + block_h, ref_x..ref_x + block_w]);
            let sad_val = sad(&block, &candidate);
            let cost = sad_val + ((dy * dy + dx * dx) as f32).sqrt() * MOTION_LAMBDA;

            if cost < best_cost {
                best_cost = cost;
                best = BlockMatch {
                    dx,
                    dy,
                    mean_abs_diff: sad_val / (block_h * block_w) as f32,
                };
            }
        }
    }

    best
}

/// Sum of Absolute Differences between two same-sized blocks
pub fn sad(block1: &ArrayView2<f32>, block2: &ArrayView2<f32>) -> f32 {
    let mut sum = 0.0f32;

    Zip::from(block1).and(block2).for_each(|&a, &b| {
        sum += (a - b).abs();
    });

    sum
}
