//! Error types for `course-graph`
//!
//! Library code returns [`CatalogError`]; the CLI turns it into a `✗` message.

use std::path::PathBuf;

/// Top-level error type for catalog loading, extraction and export
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Filesystem I/O error
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Malformed CSV export (missing header, unterminated quote, ...)
    #[error("CSV error: {message}")]
    Csv {
        /// What went wrong
        message: String,
    },

    /// Network/HTTP error while talking to the catalog endpoint
    #[error("network error: {0}")]
    Http(String),

    /// Response body or data file could not be interpreted
    #[error("parse error: {message}")]
    Parse {
        /// What went wrong
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("config error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Data validation error (unsupported override version, bad identifier, ...)
    #[error("validation error: {message}")]
    Validation {
        /// What went wrong
        message: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A prerequisite pattern failed to compile
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Create a CSV error from any displayable message
    pub fn csv(msg: impl Into<String>) -> Self {
        Self::Csv {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
