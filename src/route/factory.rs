use http::Method;
use serde_json::Value;
use std::fmt;

use super::builder::RouteBuilder;
use super::core::{Route, RouteType};
use crate::config::Config;
use crate::errors::{ErrorCode, FieldError};
use crate::schema::SchemaError;
use crate::validator::{RouteValidator, Validators};

/// Why a route definition was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No `RouteConfig` exists for the route's type
    UnknownRouteType {
        /// Display form of the route type
        route_type: String,
    },
    /// The builder was never given a handler
    MissingHandler {
        /// HTTP method
        method: String,
        /// Path template
        path: String,
    },
    /// GET routes cannot declare a body
    BodyOnGet {
        /// Path template
        path: String,
    },
    /// A schema failed to compile or is unusable for its part
    Schema {
        /// Route as `METHOD:path`
        route: String,
        /// Which schema (`path`, `query`, `body`, ...)
        part: &'static str,
        /// Underlying schema error
        source: SchemaError,
    },
    /// Extra properties do not satisfy the route type's schema
    ExtraProps {
        /// Display form of the route type
        route_type: String,
        /// Offending properties
        errors: Vec<FieldError>,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::UnknownRouteType { route_type } => {
                write!(f, "route type '{}' has no configuration", route_type)
            }
            RouteError::MissingHandler { method, path } => {
                write!(f, "route '{}:{}' has no handler", method, path)
            }
            RouteError::BodyOnGet { path } => {
                write!(f, "GET route '{}' cannot declare a body schema", path)
            }
            RouteError::Schema {
                route,
                part,
                source,
            } => write!(f, "route '{}': {} schema: {}", route, part, source),
            RouteError::ExtraProps { route_type, errors } => {
                write!(f, "invalid extra props for route type '{}'", route_type)?;
                for error in errors {
                    write!(f, "; {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Schema { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Creates routes checked against one configuration.
pub struct RouteFactory<'a, R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    config: &'a Config<R, E, C>,
}

impl<'a, R, E, C> RouteFactory<'a, R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    pub fn new(config: &'a Config<R, E, C>) -> Self {
        Self { config }
    }

    /// Validate a definition and compile its validators.
    ///
    /// # Errors
    ///
    /// See [`RouteError`] for the checks performed.
    pub fn create(&self, builder: RouteBuilder<R, C>) -> Result<Route<R, C>, RouteError> {
        let RouteBuilder {
            route_type,
            method,
            path,
            description,
            path_schema,
            query_schema,
            body_schema,
            response_schema,
            response_headers_schema,
            extra,
            handler,
        } = builder;

        let route_config =
            self.config
                .routes
                .get(&route_type)
                .ok_or_else(|| RouteError::UnknownRouteType {
                    route_type: route_type.to_string(),
                })?;
        let handler = handler.ok_or_else(|| RouteError::MissingHandler {
            method: method.to_string(),
            path: path.clone(),
        })?;

        let route_id = format!("{method}:{path}");
        let resolve = |part: &'static str, pending: Option<Result<_, SchemaError>>| {
            pending.transpose().map_err(|source| RouteError::Schema {
                route: route_id.clone(),
                part,
                source,
            })
        };
        let validators = Validators {
            path: resolve("path", path_schema)?,
            query: resolve("query", query_schema)?,
            body: resolve("body", body_schema)?,
            response: resolve("response", response_schema)?,
            response_headers: resolve("response headers", response_headers_schema)?,
        };

        if method == Method::GET && validators.body.is_some() {
            return Err(RouteError::BodyOnGet { path });
        }

        match &route_config.extra_props {
            Some(schema) => {
                if let Err(errors) = schema.safe_parse(&Value::Object(extra.clone())) {
                    return Err(RouteError::ExtraProps {
                        route_type: route_type.to_string(),
                        errors,
                    });
                }
            }
            None if !extra.is_empty() => {
                return Err(RouteError::ExtraProps {
                    route_type: route_type.to_string(),
                    errors: extra
                        .keys()
                        .map(|k| FieldError::new(k.clone(), "Unrecognized key"))
                        .collect(),
                });
            }
            None => {}
        }

        let compiled = RouteValidator::compile(&validators).map_err(|source| RouteError::Schema {
            route: route_id.clone(),
            part: "params",
            source,
        })?;

        Ok(Route {
            route_type,
            method,
            path,
            description,
            validators,
            compiled,
            extra,
            handler,
        })
    }
}
