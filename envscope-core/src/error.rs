//! Typed error handling for envscope.
//!
//! Only a bad scan root is fatal. Per-file problems never become an
//! `EnvscopeError`: they are described by [`SkipReason`], logged, and the
//! scan moves on.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for envscope operations.
#[derive(Error, Debug)]
pub enum EnvscopeError {
    /// Scan root is missing or is not a directory
    #[error("Invalid scan root {path}: {message}")]
    Path { path: PathBuf, message: String },

    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl EnvscopeError {
    /// Create a path error for an unusable scan root.
    pub fn path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this error should abort a run before any extraction.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Path { .. } | Self::InvalidArgument { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path_ref(&self) -> Option<&PathBuf> {
        match self {
            Self::Path { path, .. } => Some(path),
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Convenience type alias for envscope results.
pub type EnvscopeResult<T> = Result<T, EnvscopeError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> EnvscopeResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> EnvscopeResult<T> {
        self.map_err(|e| EnvscopeError::io(path, e))
    }
}

/// Why a single file was left out of a scan.
///
/// Non-fatal: the file contributes no records and extraction continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file could not be opened or read
    Unreadable(String),
    /// The file exceeds the size limit (bytes)
    TooLarge(usize),
    /// The file looks binary (NUL byte near the start)
    Binary,
    /// The file is not valid UTF-8
    NotUtf8,
    /// A structured config file failed to parse
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(e) => write!(f, "unreadable: {}", e),
            Self::TooLarge(len) => write!(f, "too large ({} bytes)", len),
            Self::Binary => write!(f, "binary content"),
            Self::NotUtf8 => write!(f, "not valid UTF-8"),
            Self::Malformed(e) => write!(f, "malformed: {}", e),
        }
    }
}
