//! # Pipeline Module
//!
//! The request-processing state machine.
//!
//! ## Overview
//!
//! [`Api`] owns the configuration and the route registry.
//! [`Api::process_request`] runs each request through these stages, strictly
//! in order:
//!
//! 1. `on_request` hooks
//! 2. route lookup (base path stripped, first registered match wins); a miss
//!    is `NotFound`
//! 3. decode: path params from the template, URL-decoded query, JSON body
//!    (`{}` when absent or unparsable)
//! 4. `on_route` hooks
//! 5. query validation, then path validation
//! 6. body validation (skipped for GET and routes without a body schema)
//! 7. context factory of the route's type
//! 8. `on_handler` hooks
//! 9. handler, through the route type's wrapper if one is configured
//! 10. response validation, unless disabled
//! 11. `on_response` hooks, then `200` with the handler's body and headers
//!
//! ## Failure handling
//!
//! A failure or panic at any stage stops the request. The error, together
//! with the [`PartialEvent`](crate::hooks::PartialEvent) built so far, goes to
//! the [`ErrorResolver`](crate::resolver::ErrorResolver), which always
//! produces a response.
//!
//! ## Observability
//!
//! Each request runs in a `request` span with `method`, `path` and
//! `request_id` (a ULID, reused from a valid `x-request-id` header). Hooks,
//! context factories and handlers receive a logger named
//! `<app invoker>:<request id>`.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use serde_json::json;
//! use typeroute::config::Config;
//! use typeroute::pipeline::Api;
//! use typeroute::route::{Route, SampleRouteType};
//! use typeroute::server::ApiRequest;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut api = Api::new(Config::default_config()?);
//! let route = api.create_route(
//!     Route::builder(SampleRouteType::Public, Method::GET, "/ping")
//!         .description("Liveness probe for load balancers")
//!         .handler(|_ctx| async { Ok(json!("pong")) }),
//! )?;
//! api.add_route(route)?;
//!
//! let res = api.process_request(ApiRequest::new(Method::GET, "/api/ping")).await;
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body, json!("pong"));
//! # Ok(())
//! # }
//! ```

mod core;

pub use core::Api;
