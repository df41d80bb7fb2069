//! Tracing subscriber setup.
//!
//! [`init_logging`] installs a `tracing-subscriber` registry with an
//! `EnvFilter` and one formatting layer. The request pipeline and every
//! [`Logger`](crate::logger::Logger) emit through whatever subscriber is
//! installed, so embedding applications may also bring their own.
//!
//! | Variable                 | Meaning                                  |
//! |--------------------------|------------------------------------------|
//! | `TYPEROUTE_LOG_FILTER`   | filter directives, default `info`        |
//! | `TYPEROUTE_LOG_FORMAT`   | `json` (default) or `pretty`             |
//! | `TYPEROUTE_LOG_LOCATION` | include `file:line` when `true`          |
//!
//! `RUST_LOG` wins over `TYPEROUTE_LOG_FILTER` when both are set.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const ENV_LOG_FILTER: &str = "TYPEROUTE_LOG_FILTER";
pub const ENV_LOG_FORMAT: &str = "TYPEROUTE_LOG_FORMAT";
pub const ENV_LOG_LOCATION: &str = "TYPEROUTE_LOG_LOCATION";

const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// `pretty` (any case) selects [`LogFormat::Pretty`]; anything else is JSON.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `info,typeroute::router=debug`
    pub filter: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Human-readable output with source locations, for local runs.
    pub fn pretty() -> Self {
        Self {
            filter: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
        }
    }

    /// Read the `TYPEROUTE_LOG_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables keep their
    /// defaults.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|f| !f.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }
        if let Some(location) = lookup(ENV_LOG_LOCATION) {
            config.include_location = location.trim().eq_ignore_ascii_case("true");
        }
        config
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.filter)
            .with_context(|| format!("invalid log filter '{}'", self.filter))
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails on an unparsable filter or when a global subscriber is already set.
///
/// # Example
///
/// ```no_run
/// use typeroute::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
