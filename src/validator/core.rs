use http::Method;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::params::ParamCoercer;
use crate::errors::{FieldError, ValidationError, ValidationLocation};
use crate::schema::{Schema, SchemaError};

/// The schemas declared on a route, as written.
///
/// Every part is optional. An absent path or query schema accepts no
/// parameters at all, an absent body schema validates to an empty object and
/// an absent response schema accepts any body.
#[derive(Debug, Clone, Default)]
pub struct Validators {
    pub path: Option<Schema>,
    pub query: Option<Schema>,
    pub body: Option<Schema>,
    pub response: Option<Schema>,
    pub response_headers: Option<Schema>,
}

/// Per-route validators compiled once at route creation.
#[derive(Debug, Clone)]
pub struct RouteValidator {
    path: ParamCoercer,
    query: ParamCoercer,
    body: Option<Schema>,
    response: Option<Schema>,
    response_headers: Option<Schema>,
}

impl RouteValidator {
    /// Compile shadow schemas for path and query, and the strict body schema.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a path/query schema is not a coercible
    /// object schema or a derived schema fails to compile.
    pub fn compile(validators: &Validators) -> Result<Self, SchemaError> {
        let path = param_coercer(ValidationLocation::Path, validators.path.as_ref())?;
        let query = param_coercer(ValidationLocation::Query, validators.query.as_ref())?;
        let body = validators.body.as_ref().map(Schema::strict).transpose()?;

        Ok(Self {
            path,
            query,
            body,
            response: validators.response.clone(),
            response_headers: validators.response_headers.clone(),
        })
    }

    /// Validate raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns a `Query` [`ValidationError`].
    pub fn validate_query(&self, raw: &Map<String, Value>) -> Result<Value, ValidationError> {
        self.query.coerce(raw)
    }

    /// Validate raw path parameters.
    ///
    /// # Errors
    ///
    /// Returns a `Path` [`ValidationError`].
    pub fn validate_path(&self, raw: &Map<String, Value>) -> Result<Value, ValidationError> {
        self.path.coerce(raw)
    }

    /// Validate a decoded body in strict mode.
    ///
    /// GET requests and routes without a body schema yield `{}` whatever was
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns a `Body` [`ValidationError`].
    pub fn validate_body(&self, method: &Method, body: &Value) -> Result<Value, ValidationError> {
        match &self.body {
            Some(schema) if *method != Method::GET => schema.safe_parse(body).map_err(|errors| {
                ValidationError::new(ValidationLocation::Body, errors, body.clone())
            }),
            _ => Ok(json!({})),
        }
    }

    /// Validate a handler result as the combined `{body, headers}` shape.
    ///
    /// Field paths are reported from the envelope root (`body.name`,
    /// `headers.etag`).
    ///
    /// # Errors
    ///
    /// Returns a `Response` [`ValidationError`].
    pub fn validate_response(
        &self,
        body: &Value,
        headers: &BTreeMap<String, String>,
    ) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if let Some(schema) = &self.response {
            if let Err(errs) = schema.safe_parse(body) {
                errors.extend(prefixed("body", errs));
            }
        }
        let headers_value = headers_to_value(headers);
        if let Some(schema) = &self.response_headers {
            if let Err(errs) = schema.safe_parse(&headers_value) {
                errors.extend(prefixed("headers", errs));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(
                ValidationLocation::Response,
                errors,
                json!({"body": body, "headers": headers_value}),
            ))
        }
    }
}

// Routes without a path or query schema still reject every key they receive.
fn param_coercer(
    location: ValidationLocation,
    schema: Option<&Schema>,
) -> Result<ParamCoercer, SchemaError> {
    match schema {
        Some(schema) => ParamCoercer::new(location, schema),
        None => {
            let empty = Schema::new(json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }))?;
            ParamCoercer::new(location, &empty)
        }
    }
}

fn prefixed(prefix: &str, errors: Vec<FieldError>) -> impl Iterator<Item = FieldError> + '_ {
    errors.into_iter().map(move |mut e| {
        e.field = if e.field.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", e.field)
        };
        e
    })
}

fn headers_to_value(headers: &BTreeMap<String, String>) -> Value {
    Value::Object(
        headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
