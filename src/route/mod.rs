//! # Route Module
//!
//! Route descriptors and the factory that checks them against the active
//! configuration.
//!
//! A [`Route`] ties a route type, method and path template to its schemas
//! and handler. Routes are built with [`Route::builder`] and turned into
//! immutable descriptors by [`RouteFactory::create`], which:
//!
//! - rejects route types without a configuration
//! - rejects body schemas on GET routes
//! - validates route-type extra properties (e.g. `permission`)
//! - compiles shadow, strict and response validators once
//!
//! Mounting a route under a prefix never mutates it; [`Route::with_path_prefix`]
//! returns a copy.

mod builder;
mod core;
mod factory;

pub use builder::{IntoSchema, RouteBuilder};
pub use core::{
    Handler, HandlerContext, Route, RouteResponse, RouteType, SampleRouteType, ValidatedParams,
};
pub use factory::{RouteError, RouteFactory};
