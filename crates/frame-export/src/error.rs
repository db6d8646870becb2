//! Error types for frame export.

use thiserror::Error;
use volume_pipeline::PipelineError;

/// Errors that can occur while rendering or encoding frames.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A frame update failed.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The external encoder failed or is unavailable.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Image encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid export settings or frame dimensions.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ExportError {
    /// Create an Encoder error.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Create a Validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
