//! Error types for RosterScout.
//!
//! Library crates use [`RosterScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for run-fatal RosterScout failures.
///
/// Per-candidate profile fetch failures are not represented here; they are
/// absorbed by the lookup resolver and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RosterScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error, including failure to build the shared HTTP client.
    #[error("network error: {0}")]
    Network(String),

    /// Caller-supplied input that cannot be used (e.g. a roster URL with no meet id).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RosterScoutError>;

impl RosterScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
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
}
