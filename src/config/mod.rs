//! # Config Module
//!
//! The static, route-type-indexed configuration the pipeline reads while
//! serving requests.
//!
//! ## Overview
//!
//! A [`Config`] holds:
//!
//! - per route type a [`RouteConfig`]: authorization flag, extra-props
//!   schema, context factory, optional handler wrapper and the enabled subset
//!   of error codes
//! - the error map: per error code an [`ErrorConfig`] with status,
//!   description and response validator
//! - the default error, used whenever error handling itself fails
//! - base path, lifecycle hooks, error hook, servers and the application
//!   [`Logger`](crate::logger::Logger)
//!
//! Configurations are assembled with [`ConfigBuilder`], which always seeds
//! the built-in `NotFound` (404), `ValidationFailed` (400) and
//! `UnknownError` (500) codes and rejects configurations that reference
//! unknown error codes.
//!
//! ## Settings
//!
//! Data-only fields can come from a file and the environment:
//!
//! | Variable                            | Field                     |
//! |-------------------------------------|---------------------------|
//! | `TYPEROUTE_BASE_PATH`               | `base_path`               |
//! | `TYPEROUTE_VALIDATE_RESPONSES`      | `validate_responses`      |
//! | `TYPEROUTE_SKIP_DESCRIPTIONS_CHECK` | `skip_descriptions_check` |
//! | `TYPEROUTE_LOG_LEVEL`               | logger level              |
//!
//! ```rust,ignore
//! let mut settings = Settings::from_file("typeroute.yaml")?;
//! settings.apply_env()?;
//! let config = ConfigBuilder::new().settings(&settings).route_type(..).build()?;
//! ```

mod builder;
mod core;
mod defaults;
mod settings;

pub use builder::ConfigBuilder;
pub use core::{Config, ConfigError, ErrorConfig, RouteConfig, Server};
pub use defaults::{
    builtin_errors, simple_error_schema, validation_error_schema, DEFAULT_BASE_PATH,
};
pub use settings::{
    Settings, SettingsError, ENV_BASE_PATH, ENV_LOG_LEVEL, ENV_SKIP_DESCRIPTIONS_CHECK,
    ENV_VALIDATE_RESPONSES,
};
