use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use super::core::Server;
use crate::logger::LogLevel;

/// Environment variable overriding [`Settings::base_path`].
pub const ENV_BASE_PATH: &str = "TYPEROUTE_BASE_PATH";
/// Environment variable overriding [`Settings::validate_responses`].
pub const ENV_VALIDATE_RESPONSES: &str = "TYPEROUTE_VALIDATE_RESPONSES";
/// Environment variable overriding [`Settings::skip_descriptions_check`].
pub const ENV_SKIP_DESCRIPTIONS_CHECK: &str = "TYPEROUTE_SKIP_DESCRIPTIONS_CHECK";
/// Environment variable overriding [`Settings::log_level`].
pub const ENV_LOG_LEVEL: &str = "TYPEROUTE_LOG_LEVEL";

/// The data-only part of a configuration.
///
/// Loaded from a YAML, JSON or TOML file and overridden from the
/// environment. Unset fields keep the builder defaults.
///
/// ```yaml
/// base_path: /v1
/// validate_responses: false
/// log_level: all
/// servers:
///   - url: https://api.example.com/v1
///     description: Production
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub base_path: Option<String>,
    pub validate_responses: Option<bool>,
    pub skip_descriptions_check: Option<bool>,
    pub log_level: Option<LogLevel>,
    pub servers: Vec<Server>,
}

/// Why a settings file or variable was rejected.
#[derive(Debug)]
pub enum SettingsError {
    /// The file could not be read
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file extension is not `yaml`, `yml`, `json` or `toml`
    UnsupportedFormat {
        /// File path
        path: PathBuf,
    },
    /// The file content does not match the settings shape
    Parse {
        /// File path
        path: PathBuf,
        /// Parser message
        message: String,
    },
    /// An environment variable holds an unusable value
    InvalidEnv {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "failed to read settings {}: {}", path.display(), source)
            }
            SettingsError::UnsupportedFormat { path } => write!(
                f,
                "unsupported settings format {}; expected .yaml, .yml, .json or .toml",
                path.display()
            ),
            SettingsError::Parse { path, message } => {
                write!(f, "failed to parse settings {}: {}", path.display(), message)
            }
            SettingsError::InvalidEnv { key, value } => {
                write!(f, "invalid value '{}' for {}", value, key)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Settings {
    /// Load a settings file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file is unreadable, has an unknown
    /// extension or does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        let parse_err = |message: String| SettingsError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string())),
            "json" => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
            "toml" => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
            _ => Err(SettingsError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Settings from the environment alone.
    ///
    /// # Errors
    ///
    /// See [`Settings::apply_env`].
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Settings::default();
        settings.apply_env()?;
        Ok(settings)
    }

    /// Override fields from `TYPEROUTE_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEnv`] for a boolean variable that is
    /// not `true`/`false`/`1`/`0`.
    pub fn apply_env(&mut self) -> Result<(), SettingsError> {
        self.apply_vars(|key| env::var(key).ok())
    }

    /// Override fields from any variable source.
    ///
    /// # Errors
    ///
    /// See [`Settings::apply_env`].
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            self.base_path = Some(base_path);
        }
        if let Some(val) = lookup(ENV_VALIDATE_RESPONSES) {
            self.validate_responses = Some(parse_bool(ENV_VALIDATE_RESPONSES, val)?);
        }
        if let Some(val) = lookup(ENV_SKIP_DESCRIPTIONS_CHECK) {
            self.skip_descriptions_check = Some(parse_bool(ENV_SKIP_DESCRIPTIONS_CHECK, val)?);
        }
        if let Some(val) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(LogLevel::parse(&val));
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, SettingsError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidEnv { key, value }),
    }
}
