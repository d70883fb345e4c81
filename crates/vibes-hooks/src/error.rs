use std::path::PathBuf;
use thiserror::Error;

/// Errors loading a convention rule specification.
#[derive(Debug, Error)]
pub enum ConventionError {
    #[error("rule file not found: {0}")]
    NotFound(PathBuf),

    #[error("malformed rule specification in {origin}: {message}")]
    Malformed { origin: String, message: String },

    #[error("rule '{rule}' has an invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error(transparent)]
    FileSystem(#[from] vibes_common_core::Error),
}

/// Errors raised while handling a hook invocation.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("marker store error: {0}")]
    Store(#[from] vibes_common_core::Error),

    #[error("failed to encode marker: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write hook response: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors reading or writing editor hook settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown hook event: {0}")]
    UnknownEvent(String),

    #[error("settings file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    FileSystem(#[from] vibes_common_core::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}
