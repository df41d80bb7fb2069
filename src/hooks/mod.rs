//! # Hooks Module
//!
//! Extension points the request pipeline calls out to:
//!
//! - [`Lifecycle`]: informational hooks around each stage (`on_request`,
//!   `on_route`, `on_handler`, `on_response`)
//! - [`ContextFactory`]: builds the per-request context for a route type
//! - [`HandlerWrapper`]: intercepts handler calls for a route type
//! - [`ErrorHandler`]: maps failures onto configured error codes
//!
//! ## Ordering
//!
//! ```text
//! on_request -> route lookup -> decode -> on_route -> query -> path -> body
//!   -> context factory -> on_handler -> [wrapper ->] handler -> response check
//!   -> on_response
//! ```
//!
//! Any failure along the way goes to the error resolver together with a
//! [`PartialEvent`] holding what had been built so far.

mod context;
mod core;
mod error;

pub use context::{ContextFactory, ContextParams, HandlerThunk, HandlerWrapper};
pub(crate) use context::FnContextFactory;
pub use core::{
    DecodedRequest, Lifecycle, OnHandlerEvent, OnRequestEvent, OnResponseEvent, OnRouteEvent,
    PartialEvent,
};
pub use error::{ErrorHandler, OnErrorEvent};
pub(crate) use error::FnErrorHandler;
