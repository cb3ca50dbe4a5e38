//! Error Types and Handling
//!
//! A single crate-wide error enum covering the four failure classes of the
//! pipeline: configuration problems, document loading, embedding-provider
//! failures, and artifact serialization. Use the [`Result`] alias and the
//! `?` operator to propagate errors out of pipeline stages.
//!
//! Per-file read failures during loading are intentionally *not* modeled
//! here: the loader skips unreadable files with a warning and reports the
//! skip count in the run summary rather than aborting the run.

use std::path::PathBuf;
use thiserror::Error;

/// Error types for notegraph operations
#[must_use]
#[derive(Error, Debug)]
pub enum NotegraphError {
    /// File or directory could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON artifact could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured notes directory does not exist
    #[error("Notes directory not found: {0}")]
    NotesDirNotFound(PathBuf),

    /// Configuration value is invalid (thresholds, model id, top-k)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Opaque failure from the embedding provider
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    /// Row widths or corpus sizes disagree
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Size the caller expected
        expected: usize,
        /// Size actually found
        got: usize,
    },

    /// Saved embedding-matrix artifact is corrupt or unrecognized
    #[error("Invalid embedding matrix: {0}")]
    InvalidMatrix(String),
}

/// Result type alias for notegraph operations
pub type Result<T> = std::result::Result<T, NotegraphError>;
