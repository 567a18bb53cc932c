//! Error types for the eduscol harvester.
//!
//! Library crates use [`EduscolError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all harvesting and organizing operations.
#[derive(Debug, thiserror::Error)]
pub enum EduscolError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Request failed at the transport level or returned a non-2xx status.
    #[error("network error: {0}")]
    Network(String),

    /// An expected HTML block or marker is absent from a fetched page.
    #[error("structure not found: {marker}")]
    StructureNotFound { marker: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, invalid path, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EduscolError>;

impl EduscolError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a structure-not-found error naming the missing marker.
    pub fn structure(marker: impl Into<String>) -> Self {
        Self::StructureNotFound {
            marker: marker.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a markup mismatch rather than a transport or I/O failure.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructureNotFound { .. })
    }
}
