//! Configuration file loading and parsing.

use crate::types::VibesConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Default config location relative to the project root.
pub const CONFIG_FILE: &str = ".vibes/config.yaml";

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is a valid regex")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    FileSystem(#[from] vibes_common_core::Error),
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
            config_file: None,
        }
    }

    /// Use an explicit config file instead of `.vibes/config.yaml`.
    ///
    /// An explicit file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(vibes_common_fs::path::resolve(&self.base_path, path));
        self
    }

    /// The project root this loader resolves against.
    pub fn project_root(&self) -> &Path {
        &self.base_path
    }

    /// Path of the config file that `load` reads.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| self.base_path.join(CONFIG_FILE))
    }

    /// Load the configuration, falling back to defaults if the default file is absent.
    pub fn load(&self) -> Result<VibesConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            if self.config_file.is_some() {
                return Err(ConfigError::NotFound { path: config_path });
            }
            return Ok(VibesConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        self.parse(&contents)
    }

    /// Parse configuration text (after environment expansion).
    pub fn parse(&self, contents: &str) -> Result<VibesConfig, ConfigError> {
        let expanded = self.expand_env_vars(contents)?;
        if expanded.trim().is_empty() {
            return Ok(VibesConfig::default());
        }

        let config: VibesConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_RE.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match std::env::var(var_name) {
                Ok(v) => v,
                Err(_) => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    /// Validate configuration values.
    fn validate(&self, config: &VibesConfig) -> Result<(), ConfigError> {
        let doc = &config.document;

        if doc.index_file.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "document.index_file must not be empty".to_string(),
            });
        }

        if doc.primary_extension.trim().is_empty() || doc.diagram_extension.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "document extensions must not be empty".to_string(),
            });
        }

        if config.conventions.valid_until_token_increase == 0 {
            return Err(ConfigError::ValidationError {
                message: "conventions.valid_until_token_increase must be greater than 0"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to the config file.
    pub fn save(&self, config: &VibesConfig) -> Result<(), ConfigError> {
        let config_path = self.config_path();
        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        vibes_common_fs::write_string_atomic(&config_path, &yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}
