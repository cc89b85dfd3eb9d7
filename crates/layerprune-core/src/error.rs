//! Error types for layer pruning.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pruning operations.
pub type Result<T> = std::result::Result<T, PruneError>;

/// Errors that can occur while pruning a checkpoint.
#[derive(Error, Debug)]
pub enum PruneError {
    /// The layer selection is not a block count or a list of block indices.
    #[error("invalid layer selection: {0}")]
    InvalidSelection(String),

    /// No encoder block survived selection, so there is nothing to renumber.
    #[error("selection kept no encoder blocks; nothing to prune into")]
    EmptySelection,

    /// The source model directory does not exist.
    #[error("source model not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Model directory is missing files or holds unsupported data.
    #[error("model error: {0}")]
    ModelError(String),

    /// Writing the pruned checkpoint failed.
    #[error("checkpoint error: {0}")]
    CheckpointError(String),

    /// I/O error.
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Candle tensor error.
    #[error("tensor error: {0}")]
    TensorError(#[from] candle_core::Error),
}
