use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by document operations.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("document not found: {0}")]
    NotFound(PathBuf),

    #[error("document already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("unknown document category: {0}")]
    UnknownCategory(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error(transparent)]
    FileSystem(vibes_common_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<vibes_common_core::Error> for DocsError {
    fn from(err: vibes_common_core::Error) -> Self {
        if err.is_not_found() {
            if let Some(path) = err.path() {
                return Self::NotFound(PathBuf::from(path));
            }
        }
        Self::FileSystem(err)
    }
}

impl DocsError {
    /// True for missing documents or templates.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
