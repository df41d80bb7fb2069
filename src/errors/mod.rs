//! # Errors Module
//!
//! Failure values that travel through the request pipeline and the closed but
//! extensible error-code taxonomy they resolve into.
//!
//! ## Taxonomy
//!
//! Every application error code implements [`ErrorCode`], which guarantees the
//! three built-in codes exist:
//!
//! | Code               | Raised by                                   | Body shape                                          |
//! |--------------------|---------------------------------------------|-----------------------------------------------------|
//! | `NotFound`         | route lookup miss                           | `{"error": "NotFound"}`                             |
//! | `ValidationFailed` | path, query, body or response schema errors | `{"error": {"code", "location", "fieldErrors"}}`    |
//! | `UnknownError`     | anything else                               | `{"error": "UnknownError"}`                         |
//!
//! Request-time failures are carried as [`anyhow::Error`]. The resolver downcasts
//! to [`ValidationError`], [`BuiltInError`] and [`ApiError`] to recover the typed
//! signal; every other error is unknown.
//!
//! ## Raising a configured error from a handler
//!
//! ```rust
//! use typeroute::errors::{ApiError, BuiltInErrorCode};
//! use serde_json::json;
//!
//! fn lookup(found: bool) -> anyhow::Result<serde_json::Value> {
//!     if !found {
//!         return Err(ApiError::new(BuiltInErrorCode::NotFound, json!({"error": "NotFound"})).into());
//!     }
//!     Ok(json!({"ok": true}))
//! }
//! # assert!(lookup(false).is_err());
//! ```

mod core;

pub use core::{
    simple_error_body, ApiError, BuiltInError, BuiltInErrorCode, ErrorCode, ErrorResponse,
    FieldError, ValidationError, ValidationLocation,
};
