//! # typeroute
//!
//! **typeroute** is a typed, schema-validated API routing core. Routes are
//! declared with JSON Schemas for their path, query, body and response; every
//! request is matched, coerced, validated, handed to a handler with a
//! per-route-type context, and answered with either a validated response or a
//! structured error.
//!
//! ## Overview
//!
//! The crate covers request processing only. Transport (connections, TLS,
//! framing) belongs to the host server, which converts its native request
//! into an [`ApiRequest`](server::ApiRequest) and the resulting
//! [`ApiResponse`](server::ApiResponse) back.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - **[`router`]** - segment-based path matching, first registered match wins
//! - **[`schema`]** - the JSON Schema validator boundary (`safe_parse`)
//! - **[`validator`]** - string-to-typed coercion for path/query params and
//!   the per-route compiled validators
//! - **[`route`]** - route descriptors, builder and the factory that checks
//!   them against the configuration
//! - **[`registry`]** - insertion-ordered route storage with prefix mounting
//!   and the [`linter`] description check
//! - **[`config`]** - route-type policy, error map, default error, hooks and
//!   settings
//! - **[`hooks`]** - lifecycle hooks, context factories, handler wrappers and
//!   the error hook
//! - **[`pipeline`]** - the request state machine ([`Api`])
//! - **[`resolver`]** - failure to error-response mapping with fallbacks
//! - **[`typed`]** - handlers over typed structs
//! - **[`logger`]** / **[`logging`]** - per-application logger and the
//!   `tracing` subscriber setup
//!
//! ### Request Flow
//!
//! ```text
//! ApiRequest
//!   -> on_request -> route lookup -> decode -> on_route
//!   -> query -> path -> body -> context factory -> on_handler
//!   -> [handler wrapper] handler -> response validation -> on_response
//!   -> ApiResponse (200)
//!
//! any failure -> ErrorResolver -> ApiResponse (configured status)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use serde_json::json;
//! use typeroute::config::Config;
//! use typeroute::route::{Route, SampleRouteType};
//! use typeroute::server::ApiRequest;
//! use typeroute::Api;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut api = Api::new(Config::default_config()?);
//!
//! let get_pet = api.create_route(
//!     Route::builder(SampleRouteType::Public, Method::GET, "/pets/{id}")
//!         .description("Fetch a single pet by id")
//!         .path_schema(json!({
//!             "type": "object",
//!             "properties": {"id": {"type": "integer", "description": "Pet id"}},
//!             "required": ["id"]
//!         }))
//!         .handler(|ctx| async move {
//!             let id = ctx.params.path["id"].clone();
//!             Ok(json!({"id": id, "name": "Rex"}))
//!         }),
//! )?;
//! api.add_route(get_pet)?;
//!
//! let res = api.process_request(ApiRequest::new(Method::GET, "/api/pets/7")).await;
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body, json!({"id": 7, "name": "Rex"}));
//!
//! let res = api.process_request(ApiRequest::new(Method::GET, "/api/pets/seven")).await;
//! assert_eq!(res.status, 400);
//! assert_eq!(res.body["error"]["location"], "Path");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Taxonomy
//!
//! | Code               | Default status | Body                                             |
//! |--------------------|----------------|--------------------------------------------------|
//! | `NotFound`         | 404            | `{"error": "NotFound"}`                          |
//! | `ValidationFailed` | 400            | `{"error": {"code", "location", "fieldErrors"}}` |
//! | `UnknownError`     | 500            | `{"error": "UnknownError"}`                      |
//!
//! Applications add codes through their own [`ErrorCode`](errors::ErrorCode)
//! type and the configuration's error map.

pub mod config;
pub mod errors;
pub mod hooks;
pub mod ids;
pub mod linter;
pub mod logger;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod route;
pub mod router;
pub mod schema;
pub mod server;
pub mod typed;
pub mod validator;

pub use config::{Config, ConfigBuilder, ErrorConfig, RouteConfig};
pub use errors::{ApiError, BuiltInErrorCode, ErrorCode, ErrorResponse};
pub use pipeline::Api;
pub use route::{Route, RouteResponse, SampleRouteType};
pub use server::{ApiRequest, ApiResponse};
