use serde_json::json;
use std::collections::HashMap;

use super::builder::ConfigBuilder;
use super::core::{Config, ConfigError, ErrorConfig, RouteConfig};
use crate::errors::{BuiltInErrorCode, ErrorCode};
use crate::route::SampleRouteType;
use crate::schema::{Schema, SchemaError};

/// Default mount point for all routes.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Schema of `{"error": "<code>"}` bodies.
pub fn simple_error_schema(description: &str) -> Result<Schema, SchemaError> {
    Schema::new(json!({
        "type": "object",
        "description": description,
        "properties": {
            "error": {"type": "string", "description": "Error code"}
        },
        "required": ["error"]
    }))
}

/// Schema of the `ValidationFailed` body.
pub fn validation_error_schema() -> Result<Schema, SchemaError> {
    Schema::new(json!({
        "type": "object",
        "description": "Request or response validation failed",
        "properties": {
            "error": {
                "type": "object",
                "description": "Validation failure details",
                "properties": {
                    "code": {"type": "string", "description": "Error code"},
                    "location": {
                        "enum": ["Path", "Query", "Body", "Response"],
                        "description": "Part of the exchange that failed"
                    },
                    "fieldErrors": {
                        "type": "array",
                        "description": "Offending fields",
                        "items": {
                            "type": "object",
                            "description": "A single offending field",
                            "properties": {
                                "field": {"type": "string", "description": "Dotted field path"},
                                "message": {"type": "string", "description": "What is wrong"}
                            },
                            "required": ["field", "message"]
                        }
                    }
                },
                "required": ["code", "location", "fieldErrors"]
            }
        },
        "required": ["error"]
    }))
}

/// The three error configs every configuration carries: 404, 400 and 500.
pub fn builtin_errors<E: ErrorCode>() -> Result<HashMap<E, ErrorConfig>, SchemaError> {
    let mut errors = HashMap::with_capacity(3);
    errors.insert(
        E::not_found(),
        ErrorConfig::new("404", "Not Found", simple_error_schema("Not Found")?),
    );
    errors.insert(
        E::validation_failed(),
        ErrorConfig::new("400", "Validation Failed", validation_error_schema()?),
    );
    errors.insert(
        E::unknown_error(),
        ErrorConfig::new(
            "500",
            "Internal Server Error",
            simple_error_schema("Internal Server Error")?,
        ),
    );
    Ok(errors)
}

impl Config<SampleRouteType, BuiltInErrorCode, ()> {
    /// A working configuration with one unauthenticated `Public` route type
    /// and a unit context.
    ///
    /// # Errors
    ///
    /// Only fails if a built-in error schema does not compile.
    pub fn default_config() -> Result<Self, ConfigError> {
        ConfigBuilder::new()
            .route_type(
                SampleRouteType::Public,
                RouteConfig::new(|_params| async { Ok(()) }),
            )
            .build()
    }
}
