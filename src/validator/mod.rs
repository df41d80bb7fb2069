//! # Validator Module
//!
//! Request and response validation for a single route.
//!
//! Path and query values arrive as strings, so they go through a
//! [`ParamCoercer`] that turns them into the kinds their schema declares
//! before validating. Bodies are validated in strict mode (unknown top-level
//! keys rejected). Responses are validated as the combined `{body, headers}`
//! shape.
//!
//! All derived schemas are compiled once, when the route is created, into a
//! [`RouteValidator`]; nothing is compiled on the request path.
//!
//! ## Coercion rules
//!
//! | Declared kind         | Accepted input                        | Rejected examples      |
//! |-----------------------|---------------------------------------|------------------------|
//! | `number` / `integer`  | canonical decimal form                | `007`, `+1`, `1.0`     |
//! | `boolean`             | `true`, `false`                       | `1`, `TRUE`            |
//! | `string` + `date`     | `YYYY-MM-DD`                          | `2024-1-5`             |
//! | `string` + `date-time`| `2024-01-05T10:00:00.000Z`            | `2024-01-05T10:00:00Z` |
//! | `enum`                | string form of a member               | anything else          |
//! | `array`               | one value or a repeated parameter     | nested arrays          |
//!
//! Every converted value must re-serialize to exactly the input string.

mod core;
mod params;

pub use core::{RouteValidator, Validators};
pub use params::ParamCoercer;
