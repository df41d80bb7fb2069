use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::errors::{ErrorCode, ErrorResponse, FieldError};
use crate::hooks::{
    ContextFactory, ContextParams, ErrorHandler, FnContextFactory, HandlerWrapper, Lifecycle,
};
use crate::logger::Logger;
use crate::route::{RouteFactory, RouteType};
use crate::schema::{Schema, SchemaError};

/// Policy for one route type.
pub struct RouteConfig<R, E, C>
where
    R: RouteType,
    C: Send + Sync + 'static,
{
    /// Whether routes of this type require an authenticated caller. Passed
    /// to the context factory as [`ContextParams::authorization`], which
    /// enforces it.
    pub authorization: bool,
    /// Schema for route-type specific properties; `None` allows none.
    pub extra_props: Option<Schema>,
    pub context_factory: Arc<dyn ContextFactory<R, C>>,
    pub handler_wrapper: Option<Arc<dyn HandlerWrapper<R, C>>>,
    /// Error codes routes of this type may answer with. `None` means all.
    pub errors: Option<Vec<E>>,
}

impl<R, E, C> RouteConfig<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    /// Route type built by an async context closure.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(ContextParams<R, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
    {
        Self::with_factory(Arc::new(FnContextFactory(factory)))
    }

    pub fn with_factory(factory: Arc<dyn ContextFactory<R, C>>) -> Self {
        Self {
            authorization: false,
            extra_props: None,
            context_factory: factory,
            handler_wrapper: None,
            errors: None,
        }
    }

    #[must_use]
    pub fn authorization(mut self, required: bool) -> Self {
        self.authorization = required;
        self
    }

    #[must_use]
    pub fn extra_props(mut self, schema: Schema) -> Self {
        self.extra_props = Some(schema);
        self
    }

    #[must_use]
    pub fn handler_wrapper(mut self, wrapper: Arc<dyn HandlerWrapper<R, C>>) -> Self {
        self.handler_wrapper = Some(wrapper);
        self
    }

    #[must_use]
    pub fn errors(mut self, codes: impl IntoIterator<Item = E>) -> Self {
        self.errors = Some(codes.into_iter().collect());
        self
    }

    /// Whether `code` is in this route type's enabled subset.
    #[must_use]
    pub fn allows_error(&self, code: &E) -> bool {
        self.errors.as_ref().map_or(true, |codes| codes.contains(code))
    }
}

/// Status, description and body shape of one error code.
#[derive(Debug, Clone)]
pub struct ErrorConfig {
    /// HTTP status as a three-digit numeral, e.g. `"404"`
    pub status: String,
    pub description: String,
    pub response_validator: Schema,
}

impl ErrorConfig {
    pub fn new(
        status: impl Into<String>,
        description: impl Into<String>,
        response_validator: Schema,
    ) -> Self {
        Self {
            status: status.into(),
            description: description.into(),
            response_validator,
        }
    }

    /// The status as a number, if it is a valid three-digit numeral.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        if self.status.len() != 3 {
            return None;
        }
        self.status
            .parse::<u16>()
            .ok()
            .filter(|s| (100..=599).contains(s))
    }
}

/// A server entry for generated API documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: String,
}

/// Why a configuration was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An error code is referenced but has no `ErrorConfig`
    MissingErrorCode {
        /// The missing code
        code: String,
        /// Who referenced it (`default error` or `route type 'X'`)
        referenced_by: String,
    },
    /// A status is not a three-digit numeral
    InvalidStatus {
        /// Error code
        code: String,
        /// Configured status
        status: String,
    },
    /// The default error body does not satisfy its own validator
    InvalidDefaultErrorBody {
        /// Default error code
        code: String,
        /// Validator output
        errors: Vec<FieldError>,
    },
    /// A built-in error schema failed to compile
    Schema(SchemaError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingErrorCode {
                code,
                referenced_by,
            } => write!(
                f,
                "error code '{}' referenced by {} is not in the error map",
                code, referenced_by
            ),
            ConfigError::InvalidStatus { code, status } => write!(
                f,
                "error code '{}' has invalid status '{}'; expected a three-digit numeral",
                code, status
            ),
            ConfigError::InvalidDefaultErrorBody { code, errors } => {
                write!(f, "default error '{}' body does not match its validator", code)?;
                for error in errors {
                    write!(f, "; {}", error)?;
                }
                Ok(())
            }
            ConfigError::Schema(err) => write!(f, "built-in error schema: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SchemaError> for ConfigError {
    fn from(err: SchemaError) -> Self {
        ConfigError::Schema(err)
    }
}

/// Immutable application configuration.
///
/// Built with [`ConfigBuilder`](super::ConfigBuilder); read-only while
/// requests are served.
pub struct Config<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    /// Prefix stripped from request paths before matching, e.g. `/api`
    pub base_path: String,
    pub routes: HashMap<R, RouteConfig<R, E, C>>,
    pub errors: HashMap<E, ErrorConfig>,
    pub default_error: ErrorResponse<E>,
    pub handle_error: Option<Arc<dyn ErrorHandler<R, E, C>>>,
    pub hooks: Vec<Arc<dyn Lifecycle<R, C>>>,
    pub skip_descriptions_check: bool,
    pub validate_responses: bool,
    pub servers: Vec<Server>,
    pub logger: Logger,
}

impl<R, E, C> Config<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    #[must_use]
    pub fn route_config(&self, route_type: &R) -> Option<&RouteConfig<R, E, C>> {
        self.routes.get(route_type)
    }

    #[must_use]
    pub fn error_config(&self, code: &E) -> Option<&ErrorConfig> {
        self.errors.get(code)
    }

    /// A route factory bound to this configuration.
    #[must_use]
    pub fn factory(&self) -> RouteFactory<'_, R, E, C> {
        RouteFactory::new(self)
    }

    /// Check the error-code invariants.
    ///
    /// Every enabled error code of every route type, and the default error
    /// code, must be in `errors`; every status must be a three-digit numeral;
    /// the default error body must satisfy its validator.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (code, error) in &self.errors {
            if error.status_code().is_none() {
                return Err(ConfigError::InvalidStatus {
                    code: code.to_string(),
                    status: error.status.clone(),
                });
            }
        }

        for (route_type, route_config) in &self.routes {
            for code in route_config.errors.iter().flatten() {
                if !self.errors.contains_key(code) {
                    return Err(ConfigError::MissingErrorCode {
                        code: code.to_string(),
                        referenced_by: format!("route type '{route_type}'"),
                    });
                }
            }
        }

        let default_code = &self.default_error.code;
        let default_config =
            self.errors
                .get(default_code)
                .ok_or_else(|| ConfigError::MissingErrorCode {
                    code: default_code.to_string(),
                    referenced_by: "default error".to_string(),
                })?;
        if let Err(errors) = default_config
            .response_validator
            .safe_parse(&self.default_error.body)
        {
            return Err(ConfigError::InvalidDefaultErrorBody {
                code: default_code.to_string(),
                errors,
            });
        }
        Ok(())
    }
}
