use serde_json::Value;
use std::fmt;

/// Primitive kind of a path or query field, read from its property schema.
///
/// Only these kinds can be carried as strings on the wire; anything else is
/// rejected when the route is created.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    /// `type: string, format: date` (`YYYY-MM-DD`)
    Date,
    /// `type: string, format: date-time` (RFC 3339)
    DateTime,
    /// `enum` or `const`
    Enum(Vec<Value>),
    /// `type: array` of one of the scalar kinds
    Array(Box<FieldKind>),
}

impl FieldKind {
    /// Classify a property schema.
    ///
    /// # Errors
    ///
    /// Returns the offending type name when the kind cannot be coerced from a
    /// string (objects, nested arrays, untyped schemas).
    pub fn classify(schema: &Value) -> Result<FieldKind, String> {
        if let Some(members) = schema.get("enum").and_then(Value::as_array) {
            return Ok(FieldKind::Enum(members.clone()));
        }
        if let Some(constant) = schema.get("const") {
            return Ok(FieldKind::Enum(vec![constant.clone()]));
        }

        let type_name = match schema.get("type") {
            Some(Value::String(t)) => t.as_str(),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .unwrap_or("null"),
            _ => return Err("untyped".to_string()),
        };

        match type_name {
            "string" => Ok(match schema.get("format").and_then(Value::as_str) {
                Some("date") => FieldKind::Date,
                Some("date-time") => FieldKind::DateTime,
                _ => FieldKind::String,
            }),
            "number" => Ok(FieldKind::Number),
            "integer" => Ok(FieldKind::Integer),
            "boolean" => Ok(FieldKind::Boolean),
            "array" => {
                let items = schema.get("items").ok_or_else(|| "array".to_string())?;
                match FieldKind::classify(items)? {
                    FieldKind::Array(_) => Err("array of array".to_string()),
                    inner => Ok(FieldKind::Array(Box::new(inner))),
                }
            }
            other => Err(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, FieldKind::Array(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => f.write_str("string"),
            FieldKind::Number => f.write_str("number"),
            FieldKind::Integer => f.write_str("integer"),
            FieldKind::Boolean => f.write_str("boolean"),
            FieldKind::Date => f.write_str("date"),
            FieldKind::DateTime => f.write_str("date-time"),
            FieldKind::Enum(_) => f.write_str("enum"),
            FieldKind::Array(inner) => write!(f, "array of {inner}"),
        }
    }
}
