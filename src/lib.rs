//! flowviz - optical flow visualization in Rust
//!
//! Estimates dense motion between consecutive video frames and renders each
//! motion field as a color image: hue encodes direction, saturation encodes
//! magnitude.
//!
//! # Architecture
//!
//! flowviz is organized into several key modules:
//!
//! - `util`: Color wheel, color space conversion and pixel formats
//! - `flow`: Flow fields, motion estimation and color rendering
//! - `format`: Frame sources (Y4M, image sequences) and image output
//! - `sequencer`: Frame-by-frame driver tying the pipeline together

pub mod error;
pub mod flow;
pub mod format;
pub mod sequencer;
pub mod util;

pub use error::{Error, Result};

/// flowviz version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for the flowviz library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Maximum number of threads to use for flow estimation
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

/// Initialize the flowviz library with the given configuration
pub fn init(config: Config) -> Result<()> {
    if let Some(threads) = config.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::Init(format!("Failed to initialize thread pool: {}", e)))?;
    }

    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| Error::Init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
