//! Error types for the volume pipeline.

use thiserror::Error;

/// Errors that can occur while preparing a frame for display.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resampling box or the cell budget is not usable.
    #[error("degenerate grid: volume {volume} with target cell count {target_cells}")]
    DegenerateGrid { volume: f64, target_cells: i64 },

    /// The mesh carries no scalar arrays at all.
    #[error("mesh has no scalar arrays")]
    NoScalars,

    /// Opacity channel list is unusable.
    #[error("invalid opacity channels: {0}")]
    InvalidChannels(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// The mesh collaborator failed to produce a mesh.
    #[error("failed to load mesh: {0}")]
    MeshLoad(String),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a MeshLoad error.
    pub fn mesh_load(msg: impl Into<String>) -> Self {
        Self::MeshLoad(msg.into())
    }

    /// Create an InvalidChannels error.
    pub fn invalid_channels(msg: impl Into<String>) -> Self {
        Self::InvalidChannels(msg.into())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::MeshLoad(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
