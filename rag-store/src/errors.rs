//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-file decoding errors.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The vector index file is not a readable flat index.
    #[error("index format error: {0}")]
    IndexFormat(String),

    /// Mismatch between a query vector and the index dimension.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// `k` must be a positive integer.
    #[error("k must be a positive integer, got {0}")]
    InvalidTopK(i64),

    /// The dataset file was missing or empty at startup.
    #[error("Dataset not loaded.")]
    DatasetUnavailable,

    /// A statistic could not be computed from the loaded data.
    #[error("{0}")]
    Computation(String),

    /// The embedding provider failed.
    #[error("embedding error: {0}")]
    Embedding(String),
}
