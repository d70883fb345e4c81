//! CLI error type and exit codes.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use vibes_common_config::ConfigError;
use vibes_docs::DocsError;
use vibes_hooks::{ConventionError, SettingsError};

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Validation { message: String, hint: Option<String> },

    #[error("{message}")]
    NotFound {
        message: String,
        resource_type: String,
        resource_name: String,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Short error code shown in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E004",
            Self::NotFound { .. } => "E005",
            Self::Other(_) => "E999",
        }
    }

    /// Process exit status for this error.
    pub fn status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::NotFound { .. } => 6,
            Self::Other(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } | Self::Validation { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: None,
        }
    }

    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self::NotFound {
            message: format!("{resource_type} not found: {resource_name}"),
            resource_type,
            resource_name,
        }
    }

    fn io_from(err: impl std::error::Error + Send + Sync + 'static, path: Option<PathBuf>) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
            path,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::io_from(err, None)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::not_found("config file", path.display().to_string()),
            other => Self::Config {
                message: format!("Configuration error: {other}"),
                source: Some(Box::new(other)),
                hint: Some("Check .vibes/config.yaml".to_string()),
            },
        }
    }
}

impl From<DocsError> for CliError {
    fn from(err: DocsError) -> Self {
        match err {
            DocsError::NotFound(path) => Self::not_found("file", path.display().to_string()),
            DocsError::AlreadyExists(path) => Self::validation_with_hint(
                format!("file already exists: {}", path.display()),
                "Choose another file name",
            ),
            DocsError::UnknownCategory(category) => Self::validation_with_hint(
                format!("unknown document type: {category}"),
                format!("Use one of: {}", vibes_docs::generator::CATEGORIES.join(", ")),
            ),
            DocsError::InvalidFileName(name) => Self::validation(format!("invalid file name: {name}")),
            other => Self::io_from(other, None),
        }
    }
}

impl From<ConventionError> for CliError {
    fn from(err: ConventionError) -> Self {
        match err {
            ConventionError::NotFound(path) => Self::not_found("rule file", path.display().to_string()),
            ConventionError::FileSystem(e) => {
                let path = e.path().map(PathBuf::from);
                Self::io_from(e, path)
            }
            other => Self::Config {
                message: other.to_string(),
                source: Some(Box::new(other)),
                hint: Some("Check the convention rule file".to_string()),
            },
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::NotFound(path) => Self::not_found("settings file", path.display().to_string()),
            SettingsError::UnknownEvent(event) => Self::validation_with_hint(
                format!("unknown hook event: {event}"),
                "Use PreToolUse, PostToolUse, Notification, Stop or SubagentStop",
            ),
            SettingsError::Malformed { .. } => Self::Config {
                message: err.to_string(),
                source: Some(Box::new(err)),
                hint: Some("Fix the JSON syntax of the settings file".to_string()),
            },
            other => Self::io_from(other, None),
        }
    }
}
