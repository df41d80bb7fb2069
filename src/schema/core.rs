use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::errors::FieldError;

/// Error compiling or reshaping a schema document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The document is not a valid JSON Schema
    Compile {
        /// Compiler message
        message: String,
    },
    /// An object schema was required
    NotAnObject {
        /// What the schema was meant for (e.g. `query`)
        usage: String,
    },
    /// A path or query field whose kind cannot be parsed from a string
    UnsupportedField {
        /// Property name
        field: String,
        /// Declared type
        kind: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Compile { message } => write!(f, "invalid JSON Schema: {message}"),
            SchemaError::NotAnObject { usage } => {
                write!(f, "{usage} schema must be an object schema with properties")
            }
            SchemaError::UnsupportedField { field, kind } => {
                write!(f, "field '{field}' has type '{kind}' which cannot be parsed from a string")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// A compiled JSON Schema.
///
/// Holds the raw document (for linting, shadow-schema derivation and
/// documentation) next to the compiled validator. Both sit behind `Arc`, so
/// clones are cheap and share the compiled form.
#[derive(Clone)]
pub struct Schema {
    raw: Arc<Value>,
    validator: Arc<Validator>,
}

impl Schema {
    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] when the document is not a valid schema.
    pub fn new(raw: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(&raw).map_err(|e| SchemaError::Compile {
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: Arc::new(raw),
            validator: Arc::new(validator),
        })
    }

    /// The source document.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Top-level `description`, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.raw.get("description").and_then(Value::as_str)
    }

    /// Declared `properties` of an object schema.
    #[must_use]
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.raw.get("properties").and_then(Value::as_object)
    }

    /// Whether `name` is listed in `required`.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.raw
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|req| req.iter().any(|r| r.as_str() == Some(name)))
    }

    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// Validate `value`, returning it on success or the ordered field errors.
    ///
    /// JSON Schema never transforms the instance, so a second pass over the
    /// returned value yields the same result.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per offending field.
    pub fn safe_parse(&self, value: &Value) -> Result<Value, Vec<FieldError>> {
        if self.validator.is_valid(value) {
            return Ok(value.clone());
        }
        let mut errors = Vec::new();
        for error in self.validator.iter_errors(value) {
            let base: Vec<String> = error
                .instance_path()
                .iter()
                .map(|segment| segment.to_string())
                .collect();
            match error.kind() {
                ValidationErrorKind::Required { property } => {
                    let name = property
                        .as_str()
                        .map_or_else(|| property.to_string(), str::to_owned);
                    errors.push(FieldError::new(join_field(&base, Some(name.as_str())), "Required"));
                }
                ValidationErrorKind::AdditionalProperties { unexpected } => {
                    for key in unexpected {
                        errors.push(FieldError::new(
                            join_field(&base, Some(key.as_str())),
                            "Unrecognized key",
                        ));
                    }
                }
                _ => errors.push(FieldError::new(join_field(&base, None), error.to_string())),
            }
        }
        Err(errors)
    }

    /// Copy of this schema that rejects unknown top-level keys.
    ///
    /// Only object schemas without an explicit `additionalProperties` change.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if the reshaped document fails to compile.
    pub fn strict(&self) -> Result<Schema, SchemaError> {
        match self.raw.as_ref() {
            Value::Object(map) if is_object_schema(map) && !map.contains_key("additionalProperties") => {
                let mut strict = map.clone();
                strict.insert("additionalProperties".to_string(), Value::Bool(false));
                Schema::new(Value::Object(strict))
            }
            _ => Ok(self.clone()),
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("raw", &self.raw).finish()
    }
}

pub(crate) fn is_object_schema(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some("object") || map.contains_key("properties")
}

fn join_field(base: &[String], last: Option<&str>) -> String {
    let mut parts: Vec<&str> = base.iter().map(String::as_str).collect();
    if let Some(last) = last {
        parts.push(last);
    }
    parts.join(".")
}
