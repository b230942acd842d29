//! Common test utilities for flowviz integration tests
//!
//! Helpers for generating synthetic videos (Y4M files and image sequences)
//! with known motion, and for inspecting output directories.

#![allow(dead_code)]

use flowviz_lib::util::ChromaSubsampling;
use image::RgbImage;
use std::fs::File;
use std::path::{Path, PathBuf};

// ============================================================================
// Frame Generation
// ============================================================================

/// Deterministic texture value for a pixel position
///
/// Aperiodic so that block matching has a single best match.
pub fn texture(x: i64, y: i64) -> u8 {
    let mut h = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) as u64;
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    (h % 200) as u8 + 28
}

/// Luma planes of a texture moving `step` pixels to the right per frame
pub fn moving_texture_luma(width: usize, height: usize, frames: usize, step: i64) -> Vec<Vec<u8>> {
    (0..frames)
        .map(|t| {
            let shift = step * t as i64;
            let mut plane = Vec::with_capacity(width * height);
            for y in 0..height {
                for x in 0..width {
                    plane.push(texture(x as i64 - shift, y as i64));
                }
            }
            plane
        })
        .collect()
}

/// Gray RGB frames of a texture moving `step` pixels to the right per frame
pub fn moving_texture_frames(width: u32, height: u32, frames: usize, step: i64) -> Vec<RgbImage> {
    (0..frames)
        .map(|t| {
            let shift = step * t as i64;
            RgbImage::from_fn(width, height, |x, y| {
                let v = texture(x as i64 - shift, y as i64);
                image::Rgb([v, v, v])
            })
        })
        .collect()
}

// ============================================================================
// Source Files
// ============================================================================

/// Write a 4:2:0 Y4M file with neutral chroma from luma planes
pub fn write_y4m(path: &Path, width: usize, height: usize, luma: &[Vec<u8>]) {
    let mut file = File::create(path).expect("Failed to create y4m file");
    let mut encoder = y4m::encode(width, height, y4m::Ratio::new(25, 1))
        .with_colorspace(y4m::Colorspace::C420jpeg)
        .write_header(&mut file)
        .expect("Failed to write y4m header");

    let (cw, ch) = ChromaSubsampling::YUV420.plane_size(width, height);
    let u = vec![128u8; cw * ch];
    let v = vec![128u8; cw * ch];
    for y in luma {
        encoder
            .write_frame(&y4m::Frame::new([&y[..], &u[..], &v[..]], None))
            .expect("Failed to write y4m frame");
    }
}

/// Write frames as `frame_NNNN.png` into a directory
pub fn write_png_sequence(dir: &Path, frames: &[RgbImage]) {
    std::fs::create_dir_all(dir).expect("Failed to create frame directory");
    for (i, frame) in frames.iter().enumerate() {
        frame
            .save(dir.join(format!("frame_{:04}.png", i)))
            .expect("Failed to write frame");
    }
}

// ============================================================================
// Output Inspection
// ============================================================================

/// Sorted file names in a directory; empty if it does not exist
pub fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Expected output names `00001.<ext>` through `<count>.<ext>`
pub fn expected_names(count: usize, ext: &str) -> Vec<String> {
    (1..=count).map(|i| format!("{:05}.{}", i, ext)).collect()
}

/// Path of the output image with a given index
pub fn output_path(dir: &Path, index: usize, ext: &str) -> PathBuf {
    dir.join(format!("{:05}.{}", index, ext))
}
