use std::collections::HashMap;
use std::sync::Arc;

use super::core::{Config, ConfigError, ErrorConfig, RouteConfig, Server};
use super::defaults::{builtin_errors, DEFAULT_BASE_PATH};
use super::settings::Settings;
use crate::errors::{ErrorCode, ErrorResponse};
use crate::hooks::{ErrorHandler, FnErrorHandler, Lifecycle, OnErrorEvent};
use crate::logger::Logger;
use crate::route::RouteType;

/// Assembles a [`Config`].
///
/// Each step consumes and returns the builder. [`ConfigBuilder::build`] seeds
/// the built-in error codes, fills defaults and checks the invariants.
///
/// ```rust,ignore
/// let config = ConfigBuilder::new()
///     .base_path("/v1")
///     .route_type(Kind::Public, RouteConfig::new(|_| async { Ok(Ctx::Anonymous) }))
///     .route_type(
///         Kind::User,
///         RouteConfig::new(|p| async move { authenticate(&p.request).await })
///             .authorization(true)
///             .errors([AppError::NotFound, AppError::Forbidden]),
///     )
///     .error(AppError::Forbidden, ErrorConfig::new("403", "Forbidden", forbidden_schema))
///     .build()?;
/// ```
pub struct ConfigBuilder<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    base_path: String,
    routes: HashMap<R, RouteConfig<R, E, C>>,
    errors: HashMap<E, ErrorConfig>,
    default_error: Option<ErrorResponse<E>>,
    handle_error: Option<Arc<dyn ErrorHandler<R, E, C>>>,
    hooks: Vec<Arc<dyn Lifecycle<R, C>>>,
    skip_descriptions_check: bool,
    validate_responses: bool,
    servers: Vec<Server>,
    logger: Logger,
}

impl<R, E, C> Default for ConfigBuilder<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E, C> ConfigBuilder<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            routes: HashMap::new(),
            errors: HashMap::new(),
            default_error: None,
            handle_error: None,
            hooks: Vec::new(),
            skip_descriptions_check: false,
            validate_responses: true,
            servers: Vec::new(),
            logger: Logger::default(),
        }
    }

    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    #[must_use]
    pub fn route_type(mut self, route_type: R, config: RouteConfig<R, E, C>) -> Self {
        self.routes.insert(route_type, config);
        self
    }

    /// Add or replace an error code. Replacing a built-in code changes its
    /// status or body shape.
    #[must_use]
    pub fn error(mut self, code: E, config: ErrorConfig) -> Self {
        self.errors.insert(code, config);
        self
    }

    /// Response used when error handling itself fails. Defaults to
    /// `UnknownError` with `{"error": "UnknownError"}`.
    #[must_use]
    pub fn default_error(mut self, error: ErrorResponse<E>) -> Self {
        self.default_error = Some(error);
        self
    }

    #[must_use]
    pub fn handle_error(mut self, handler: Arc<dyn ErrorHandler<R, E, C>>) -> Self {
        self.handle_error = Some(handler);
        self
    }

    /// Use a closure as the error hook.
    #[must_use]
    pub fn handle_error_fn<F>(self, handler: F) -> Self
    where
        F: for<'a, 'b> Fn(&'a OnErrorEvent<'b, R, C>) -> anyhow::Result<Option<ErrorResponse<E>>>
            + Send
            + Sync
            + 'static,
    {
        self.handle_error(Arc::new(FnErrorHandler(handler)))
    }

    /// Append a lifecycle hook. Hooks run in the order added.
    #[must_use]
    pub fn hook(mut self, hook: Arc<dyn Lifecycle<R, C>>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn skip_descriptions_check(mut self, skip: bool) -> Self {
        self.skip_descriptions_check = skip;
        self
    }

    #[must_use]
    pub fn validate_responses(mut self, validate: bool) -> Self {
        self.validate_responses = validate;
        self
    }

    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: impl Into<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description: description.into(),
        });
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Apply the fields a settings file or the environment provided.
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        if let Some(base_path) = &settings.base_path {
            self.base_path = base_path.clone();
        }
        if let Some(validate) = settings.validate_responses {
            self.validate_responses = validate;
        }
        if let Some(skip) = settings.skip_descriptions_check {
            self.skip_descriptions_check = skip;
        }
        if let Some(level) = settings.log_level {
            self.logger = self.logger.with_level(level);
        }
        self.servers.extend(settings.servers.iter().cloned());
        self
    }

    /// Finish the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an error code is referenced but not
    /// configured, a status is malformed, or the default error body does not
    /// match its validator.
    pub fn build(self) -> Result<Config<R, E, C>, ConfigError> {
        let mut errors = builtin_errors::<E>()?;
        errors.extend(self.errors);

        let servers = if self.servers.is_empty() {
            vec![Server {
                url: self.base_path.clone(),
                description: "Local".to_string(),
            }]
        } else {
            self.servers
        };

        let config = Config {
            base_path: self.base_path,
            routes: self.routes,
            errors,
            default_error: self
                .default_error
                .unwrap_or_else(|| ErrorResponse::simple(E::unknown_error())),
            handle_error: self.handle_error,
            hooks: self.hooks,
            skip_descriptions_check: self.skip_descriptions_check,
            validate_responses: self.validate_responses,
            servers,
            logger: self.logger,
        };
        config.validate()?;

        tracing::debug!(
            base_path = %config.base_path,
            route_types = config.routes.len(),
            error_codes = config.errors.len(),
            hooks = config.hooks.len(),
            "configuration built"
        );
        Ok(config)
    }
}
