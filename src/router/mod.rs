//! # Router Module
//!
//! Path matching and path-parameter extraction.
//!
//! ## Overview
//!
//! [`Router`] is a generic route table keyed by method and path template
//! (`/pets/{id}`). The registry stores routes in it; the pipeline asks it for
//! the route of each request.
//!
//! ## Matching rules
//!
//! 1. Both template and request path are split on `/` and empty segments are
//!    dropped, so `/a/` and `/a` are the same path.
//! 2. An entry is a candidate only if its method and segment count equal the
//!    request's.
//! 3. A template segment containing `{` matches anything; any other segment
//!    must be equal.
//! 4. The first candidate in insertion order wins. Registration order is the
//!    only precedence rule.
//!
//! Parameter values are percent-decoded (`/files/a%20b` yields `a b`).
//!
//! ## Performance
//!
//! Matching is a linear scan over pre-split templates. Parameters are
//! collected into a [`ParamVec`], which stays on the stack for up to
//! [`MAX_INLINE_PARAMS`] parameters.

mod core;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
