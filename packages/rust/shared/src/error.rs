//! Error types for pagetree.
//!
//! Construction-time failures abort the whole parse and surface as a
//! [`PageTreeError`]; query-time misses (unknown node id, absent property,
//! unresolvable URL) are plain `None` results and never reach this type.

use std::path::PathBuf;

/// Top-level error type for all pagetree operations.
#[derive(Debug, thiserror::Error)]
pub enum PageTreeError {
    /// Invalid input before any parsing happened (empty path, bad options).
    #[error("config error: {message}")]
    Config { message: String },

    /// Markup source could not be decoded (bad attribute on a named node,
    /// missing structural attribute, malformed nested fragment).
    #[error("markup error: {message}")]
    Markup { message: String },

    /// Binary record stream could not be decoded (unexpected type tag,
    /// truncated stream, malformed snapshot frame).
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A structural invariant of the source does not hold (duplicate node
    /// id, ancestor missing from the node set).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageTreeError>;

impl PageTreeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a markup error from any displayable message.
    pub fn markup(msg: impl Into<String>) -> Self {
        Self::Markup {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
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
}
