//! Error types for flowviz

use thiserror::Error;

/// Result type alias for flowviz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for flowviz
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The video source could not be opened
    #[error("Could not initialize capturing: {0}")]
    SourceOpen(String),

    /// The source delivered no first frame
    #[error("Failed to read the first frame")]
    EmptyFirstFrame,

    /// The source ended before its declared frame count
    #[error("Can't read frame {index}: source ended prematurely")]
    PrematureEndOfStream { index: usize },

    /// Container format error
    #[error("Format error: {0}")]
    Format(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a source open error
    pub fn source_open<S: Into<String>>(msg: S) -> Self {
        Error::SourceOpen(msg.into())
    }

    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Whether the error is reported on standard output rather than standard error
    pub fn reports_to_stdout(&self) -> bool {
        matches!(self, Error::SourceOpen(_))
    }
}
