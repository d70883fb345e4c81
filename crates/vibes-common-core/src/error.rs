//! Error types shared by the vibes crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub const GENERIC: Self = Self("GENERIC");
    pub const CONFIG_INVALID: Self = Self("CONFIG_INVALID");
    pub const FILE_NOT_FOUND: Self = Self("FILE_NOT_FOUND");
    pub const FILE_READ_ERROR: Self = Self("FILE_READ_ERROR");
    pub const FILE_WRITE_ERROR: Self = Self("FILE_WRITE_ERROR");
    pub const FILE_TOO_LARGE: Self = Self("FILE_TOO_LARGE");

    /// The code as a string slice.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Broad error grouping, used for exit codes and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Generic,
    Configuration,
    FileSystem,
}

/// The main error type for vibes operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error with the offending path.
    #[error("{message}")]
    FileSystem {
        code: ErrorCode,
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Generic(_) => ErrorCode::GENERIC,
            Self::Config(_) => ErrorCode::CONFIG_INVALID,
            Self::FileSystem { code, .. } => *code,
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorCode::FILE_NOT_FOUND,
            Self::Io(_) => ErrorCode::FILE_READ_ERROR,
        }
    }

    /// Category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Generic(_) => ErrorCategory::Generic,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::FileSystem { .. } | Self::Io(_) => ErrorCategory::FileSystem,
        }
    }

    /// True when the error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::FILE_NOT_FOUND
    }

    /// Path attached to a filesystem error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::FileSystem { path, .. } => path.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias using the vibes Error.
pub type Result<T> = std::result::Result<T, Error>;
