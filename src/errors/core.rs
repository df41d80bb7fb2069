use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::hash::Hash;

/// An application error code.
///
/// Codes are keys into the configured error map, which binds each one to an
/// HTTP status and a response-shape validator. The `Display` form is the wire
/// name that appears in response bodies (`NotFound`, `ValidationFailed`, ...).
///
/// Applications usually define their own enum and map the three built-in
/// constructors onto it:
///
/// ```rust
/// use std::fmt;
/// use typeroute::errors::ErrorCode;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum AppError { NotFound, ValidationFailed, UnknownError, Forbidden }
///
/// impl fmt::Display for AppError {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         fmt::Debug::fmt(self, f)
///     }
/// }
///
/// impl ErrorCode for AppError {
///     fn not_found() -> Self { AppError::NotFound }
///     fn validation_failed() -> Self { AppError::ValidationFailed }
///     fn unknown_error() -> Self { AppError::UnknownError }
/// }
/// ```
pub trait ErrorCode: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Code raised when no route matches the request.
    fn not_found() -> Self;
    /// Code raised for any path, query, body or response schema violation.
    fn validation_failed() -> Self;
    /// Catch-all code for every other failure.
    fn unknown_error() -> Self;
}

/// The error codes every configuration carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltInErrorCode {
    NotFound,
    ValidationFailed,
    UnknownError,
}

impl BuiltInErrorCode {
    /// Map onto the equivalent application code.
    #[must_use]
    pub fn to_code<E: ErrorCode>(self) -> E {
        match self {
            BuiltInErrorCode::NotFound => E::not_found(),
            BuiltInErrorCode::ValidationFailed => E::validation_failed(),
            BuiltInErrorCode::UnknownError => E::unknown_error(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltInErrorCode::NotFound => "NotFound",
            BuiltInErrorCode::ValidationFailed => "ValidationFailed",
            BuiltInErrorCode::UnknownError => "UnknownError",
        }
    }
}

impl fmt::Display for BuiltInErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorCode for BuiltInErrorCode {
    fn not_found() -> Self {
        BuiltInErrorCode::NotFound
    }

    fn validation_failed() -> Self {
        BuiltInErrorCode::ValidationFailed
    }

    fn unknown_error() -> Self {
        BuiltInErrorCode::UnknownError
    }
}

/// Which part of the exchange failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationLocation {
    Path,
    Query,
    Body,
    Response,
}

impl fmt::Display for ValidationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationLocation::Path => "Path",
            ValidationLocation::Query => "Query",
            ValidationLocation::Body => "Body",
            ValidationLocation::Response => "Response",
        };
        f.write_str(name)
    }
}

/// A single offending field reported by a schema.
///
/// `field` is the dotted path to the value (`items.0.name`); the empty string
/// denotes the root. Nested errors are only present for composite failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    /// Attach nested errors.
    #[must_use]
    pub fn with_nested(mut self, nested: Vec<FieldError>) -> Self {
        self.field_errors = nested;
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// A schema violation at one location of the exchange.
///
/// Carries the raw offending data for logging; the data never reaches the
/// response body.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: ValidationLocation,
    pub field_errors: Vec<FieldError>,
    pub data: Value,
}

impl ValidationError {
    pub fn new(location: ValidationLocation, field_errors: Vec<FieldError>, data: Value) -> Self {
        Self {
            location,
            field_errors,
            data,
        }
    }

    /// Response body in the `ValidationFailed` shape.
    #[must_use]
    pub fn body(&self, code: &impl fmt::Display) -> Value {
        json!({
            "error": {
                "code": code.to_string(),
                "location": self.location,
                "fieldErrors": self.field_errors,
            }
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed", self.location)?;
        for (idx, error) in self.field_errors.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A built-in failure raised by the pipeline itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltInError {
    pub code: BuiltInErrorCode,
    /// Diagnostic detail for logs.
    pub detail: String,
}

impl BuiltInError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            code: BuiltInErrorCode::NotFound,
            detail: detail.into(),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            code: BuiltInErrorCode::UnknownError,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for BuiltInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

impl std::error::Error for BuiltInError {}

/// An error code and body raised explicitly by user code.
///
/// Handlers, context factories and hooks return this (converted into
/// `anyhow::Error`) to answer with one of the configured error codes. The body
/// is still checked against that code's response validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError<E> {
    pub code: E,
    pub body: Value,
}

impl<E> ApiError<E> {
    pub fn new(code: E, body: Value) -> Self {
        Self { code, body }
    }
}

impl<E: fmt::Display> fmt::Display for ApiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api error {}", self.code)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ApiError<E> {}

/// A resolved error: the code selects status and validator, the body is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse<E> {
    pub code: E,
    pub body: Value,
}

impl<E: ErrorCode> ErrorResponse<E> {
    pub fn new(code: E, body: Value) -> Self {
        Self { code, body }
    }

    /// `{"error": "<code>"}` for the given code.
    #[must_use]
    pub fn simple(code: E) -> Self {
        let body = simple_error_body(&code);
        Self { code, body }
    }
}

impl<E> From<ApiError<E>> for ErrorResponse<E> {
    fn from(err: ApiError<E>) -> Self {
        Self {
            code: err.code,
            body: err.body,
        }
    }
}

/// `{"error": "<code>"}`, the body of `NotFound` and `UnknownError`.
#[must_use]
pub fn simple_error_body(code: &impl fmt::Display) -> Value {
    json!({ "error": code.to_string() })
}
