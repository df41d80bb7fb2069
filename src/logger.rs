//! Per-application logger handed to hooks, context factories and handlers.
//!
//! A [`Logger`] is an explicit value carrying its own [`LogLevel`]; there is no
//! process-wide verbosity switch. Each call becomes a `tracing` event with an
//! `invoker` field, so output goes wherever the installed subscriber sends it
//! (see [`crate::logging`]).
//!
//! ```rust
//! use typeroute::logger::{LogLevel, Logger};
//!
//! let api = Logger::new("api").with_level(LogLevel::All);
//! let child = api.extend("users");
//! assert_eq!(child.invoker(), "api:users");
//! child.debug("listing users");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Verbosity of a [`Logger`].
///
/// `Error` emits only errors, `Info` adds info messages, `All` adds debug.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    All,
}

impl LogLevel {
    /// Parse `error`, `info` or `all` (case-insensitive). Anything else is `Info`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "all" | "debug" => LogLevel::All,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => f.write_str("error"),
            LogLevel::Info => f.write_str("info"),
            LogLevel::All => f.write_str("all"),
        }
    }
}

/// Named logger with its own level.
#[derive(Debug, Clone)]
pub struct Logger {
    invoker: Arc<str>,
    level: LogLevel,
}

impl Logger {
    pub fn new(invoker: impl AsRef<str>) -> Self {
        Self {
            invoker: Arc::from(invoker.as_ref()),
            level: LogLevel::default(),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn invoker(&self) -> &str {
        &self.invoker
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Child logger named `parent:name`, sharing this logger's level.
    #[must_use]
    pub fn extend(&self, name: &str) -> Logger {
        Logger {
            invoker: Arc::from(format!("{}:{}", self.invoker, name)),
            level: self.level,
        }
    }

    /// Whether messages at `level` are emitted.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level >= level
    }

    pub fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            info!(invoker = %self.invoker, "{message}");
        }
    }

    pub fn info_with(&self, message: &str, data: &Value) {
        if self.enabled(LogLevel::Info) {
            info!(invoker = %self.invoker, data = %data, "{message}");
        }
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(LogLevel::All) {
            debug!(invoker = %self.invoker, "{message}");
        }
    }

    pub fn debug_with(&self, message: &str, data: &Value) {
        if self.enabled(LogLevel::All) {
            debug!(invoker = %self.invoker, data = %data, "{message}");
        }
    }

    /// Errors are always emitted; the full error chain goes into `error`.
    pub fn error(&self, message: &str, err: &anyhow::Error) {
        let chain = format!("{err:#}");
        error!(invoker = %self.invoker, error = %chain, "{message}");
    }

    pub fn error_with(&self, message: &str, err: &anyhow::Error, data: &Value) {
        let chain = format!("{err:#}");
        error!(
            invoker = %self.invoker,
            error = %chain,
            data = %data,
            "{message}"
        );
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new("typeroute")
    }
}
