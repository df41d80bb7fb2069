//! # Schema Module
//!
//! The validator boundary used uniformly for path, query, body and response
//! data. Schemas are JSON Schema documents compiled once with the
//! [`jsonschema`] crate and shared behind `Arc`.
//!
//! [`Schema::safe_parse`] returns either the validated value or an ordered list
//! of [`FieldError`](crate::errors::FieldError)s with dotted field paths:
//!
//! ```rust
//! use serde_json::json;
//! use typeroute::schema::Schema;
//!
//! let schema = Schema::new(json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! assert!(schema.safe_parse(&json!({"name": "Rex"})).is_ok());
//! let errors = schema.safe_parse(&json!({})).unwrap_err();
//! assert_eq!(errors[0].field, "name");
//! assert_eq!(errors[0].message, "Required");
//! ```
//!
//! [`FieldKind`] reads the primitive kind of a path/query property, which
//! drives string coercion in [`crate::validator`].

mod core;
mod kind;
mod utils;

pub use core::{Schema, SchemaError};
pub use kind::FieldKind;
pub use utils::{paginated_query, paginated_response};

#[cfg(test)]
mod tests;
