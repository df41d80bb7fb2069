use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::errors::{FieldError, ValidationError, ValidationLocation};
use crate::schema::{FieldKind, Schema, SchemaError};

#[derive(Debug, Clone)]
struct ParamField {
    name: String,
    kind: FieldKind,
    default: Option<Value>,
}

/// Converts raw string path or query values into typed values.
///
/// Built once per route from the target object schema:
///
/// 1. A **shadow schema** accepts each declared field as a string (or, for
///    array fields, a string or list of strings), rejects unknown keys and
///    enforces which fields are required.
/// 2. Each accepted string is parsed into the field's declared kind and must
///    re-serialize to exactly the input. `"32"` becomes `32`; `"007"`, `"+1"`
///    and `"1.0"` are rejected.
/// 3. Absent fields with a `default` get it, and the result is checked
///    against the target schema.
#[derive(Debug, Clone)]
pub struct ParamCoercer {
    location: ValidationLocation,
    fields: Vec<ParamField>,
    shadow: Schema,
    target: Schema,
}

impl ParamCoercer {
    /// Build a coercer for a path or query object schema.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::NotAnObject`] when `target` declares no properties
    /// - [`SchemaError::UnsupportedField`] for objects, nested arrays or
    ///   untyped fields
    pub fn new(location: ValidationLocation, target: &Schema) -> Result<Self, SchemaError> {
        let properties = target.properties().ok_or_else(|| SchemaError::NotAnObject {
            usage: location.to_string().to_lowercase(),
        })?;

        let mut fields = Vec::with_capacity(properties.len());
        let mut shadow_props = Map::new();
        let mut required = Vec::new();

        for (name, property) in properties {
            let kind = FieldKind::classify(property).map_err(|kind| SchemaError::UnsupportedField {
                field: name.clone(),
                kind,
            })?;
            let default = property.get("default").cloned();

            let shadow = if kind.is_array() {
                json!({"anyOf": [
                    {"type": "string"},
                    {"type": "array", "items": {"type": "string"}}
                ]})
            } else {
                json!({"type": "string"})
            };
            shadow_props.insert(name.clone(), shadow);
            if target.is_required(name) && default.is_none() {
                required.push(Value::String(name.clone()));
            }
            fields.push(ParamField {
                name: name.clone(),
                kind,
                default,
            });
        }

        let shadow = Schema::new(json!({
            "type": "object",
            "properties": shadow_props,
            "required": required,
            "additionalProperties": false
        }))?;

        Ok(Self {
            location,
            fields,
            shadow,
            target: target.clone(),
        })
    }

    #[must_use]
    pub fn location(&self) -> ValidationLocation {
        self.location
    }

    /// Shadow-parse, convert and validate a raw parameter map.
    ///
    /// Values in `raw` are strings, or arrays of strings for repeated query
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] at this coercer's location carrying every
    /// offending field and the raw input.
    pub fn coerce(&self, raw: &Map<String, Value>) -> Result<Value, ValidationError> {
        let raw_value = Value::Object(raw.clone());
        if let Err(errors) = self.shadow.safe_parse(&raw_value) {
            return Err(ValidationError::new(self.location, errors, raw_value));
        }

        let mut converted = Map::new();
        let mut errors = Vec::new();
        for field in &self.fields {
            match raw.get(&field.name) {
                Some(value) => match coerce_field(&field.name, &field.kind, value) {
                    Ok(v) => {
                        converted.insert(field.name.clone(), v);
                    }
                    Err(e) => errors.push(e),
                },
                None => {
                    if let Some(default) = &field.default {
                        converted.insert(field.name.clone(), default.clone());
                    }
                }
            }
        }
        if !errors.is_empty() {
            return Err(ValidationError::new(self.location, errors, raw_value));
        }

        self.target
            .safe_parse(&Value::Object(converted))
            .map_err(|errors| ValidationError::new(self.location, errors, raw_value))
    }
}

fn coerce_field(name: &str, kind: &FieldKind, value: &Value) -> Result<Value, FieldError> {
    match (kind, value) {
        (FieldKind::Array(inner), Value::String(s)) => coerce_scalar(inner, s)
            .map(|v| Value::Array(vec![v]))
            .map_err(|msg| FieldError::new(format!("{name}.0"), msg)),
        (FieldKind::Array(inner), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let field = format!("{name}.{idx}");
                let s = item
                    .as_str()
                    .ok_or_else(|| FieldError::new(field.clone(), "Expected string"))?;
                out.push(coerce_scalar(inner, s).map_err(|msg| FieldError::new(field, msg))?);
            }
            Ok(Value::Array(out))
        }
        (_, Value::String(s)) => coerce_scalar(kind, s).map_err(|msg| FieldError::new(name, msg)),
        _ => Err(FieldError::new(name, "Expected string")),
    }
}

fn coerce_scalar(kind: &FieldKind, input: &str) -> Result<Value, String> {
    match kind {
        FieldKind::String => Ok(Value::String(input.to_string())),
        FieldKind::Number | FieldKind::Integer => parse_number(kind, input),
        FieldKind::Boolean => match input {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("Expected 'true' or 'false', received '{input}'")),
        },
        FieldKind::Date => {
            let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map_err(|_| format!("Expected date, received '{input}'"))?;
            round_trip(kind, date.format("%Y-%m-%d").to_string(), input)
        }
        FieldKind::DateTime => {
            let parsed = DateTime::parse_from_rfc3339(input)
                .map_err(|_| format!("Expected date-time, received '{input}'"))?;
            let canonical = parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            round_trip(kind, canonical, input)
        }
        FieldKind::Enum(members) => members
            .iter()
            .find(|member| scalar_to_string(member).as_deref() == Some(input))
            .cloned()
            .ok_or_else(|| {
                let expected: Vec<String> = members
                    .iter()
                    .filter_map(scalar_to_string)
                    .map(|m| format!("'{m}'"))
                    .collect();
                format!(
                    "Invalid enum value. Expected {}, received '{input}'",
                    expected.join(" | ")
                )
            }),
        FieldKind::Array(_) => Err("Expected a single value".to_string()),
    }
}

fn parse_number(kind: &FieldKind, input: &str) -> Result<Value, String> {
    let n: f64 = input
        .parse()
        .map_err(|_| format!("Expected {kind}, received '{input}'"))?;
    if !n.is_finite() {
        return Err(format!("Expected {kind}, received '{input}'"));
    }
    let canonical = number_to_string(n);
    if canonical != input {
        return Err(format!("Not a valid {kind}: '{canonical}' != '{input}'"));
    }
    Ok(number_value(n))
}

fn round_trip(kind: &FieldKind, canonical: String, input: &str) -> Result<Value, String> {
    if canonical == input {
        Ok(Value::String(canonical))
    } else {
        Err(format!("Not a valid {kind}: '{canonical}' != '{input}'"))
    }
}

// Integral values inside the exactly-representable range become JSON
// integers.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

// Shortest round-trip digits, exponent form outside [1e-6, 1e21).
fn number_to_string(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(n).to_string()
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < EXACT_INT_LIMIT {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => n.as_f64().map(number_to_string),
        _ => None,
    }
}
