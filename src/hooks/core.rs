use async_trait::async_trait;
use http::Method;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::logger::Logger;
use crate::route::{Route, RouteType, ValidatedParams};
use crate::server::{ApiRequest, ApiResponse};

/// Request data after decoding, before validation.
#[derive(Debug, Clone)]
pub struct DecodedRequest {
    /// Request path with the base path removed
    pub path: String,
    pub method: Method,
    /// Raw path params from the matched template
    pub params: Map<String, Value>,
    /// URL-decoded query; repeated keys hold arrays
    pub query: Map<String, Value>,
    /// JSON body, `{}` when absent or unparsable
    pub body: Value,
}

pub struct OnRequestEvent<'a> {
    pub request: &'a ApiRequest,
    pub logger: &'a Logger,
}

pub struct OnRouteEvent<'a, R, C> {
    pub request: &'a ApiRequest,
    pub logger: &'a Logger,
    pub route: &'a Route<R, C>,
    pub decoded: &'a DecodedRequest,
}

pub struct OnHandlerEvent<'a, R, C> {
    pub request: &'a ApiRequest,
    pub logger: &'a Logger,
    pub route: &'a Route<R, C>,
    pub decoded: &'a DecodedRequest,
    pub validated: &'a ValidatedParams,
}

pub struct OnResponseEvent<'a, R, C> {
    pub request: &'a ApiRequest,
    pub logger: &'a Logger,
    pub route: &'a Route<R, C>,
    pub decoded: &'a DecodedRequest,
    pub validated: &'a ValidatedParams,
    pub response: &'a ApiResponse,
}

/// Whatever the pipeline had built when a failure happened.
///
/// Fields fill in as the request advances, so an error hook can tell a route
/// miss (no `route`) from a handler failure (`validated` set, no `response`).
pub struct PartialEvent<R, C> {
    pub route: Option<Arc<Route<R, C>>>,
    pub decoded: Option<DecodedRequest>,
    pub validated: Option<ValidatedParams>,
    pub response: Option<ApiResponse>,
}

impl<R, C> Default for PartialEvent<R, C> {
    fn default() -> Self {
        Self {
            route: None,
            decoded: None,
            validated: None,
            response: None,
        }
    }
}

/// Observes each stage of request processing.
///
/// All methods default to no-ops. Hooks run in registration order and an
/// `Err` from any of them fails the request like any other error.
#[async_trait]
pub trait Lifecycle<R, C>: Send + Sync
where
    R: RouteType,
    C: Send + Sync + 'static,
{
    /// Before route lookup.
    async fn on_request(&self, _event: &OnRequestEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// After decoding, before validation.
    async fn on_route(&self, _event: &OnRouteEvent<'_, R, C>) -> anyhow::Result<()> {
        Ok(())
    }

    /// After the context is built, right before the handler.
    async fn on_handler(&self, _event: &OnHandlerEvent<'_, R, C>) -> anyhow::Result<()> {
        Ok(())
    }

    /// After the response passed validation.
    async fn on_response(&self, _event: &OnResponseEvent<'_, R, C>) -> anyhow::Result<()> {
        Ok(())
    }
}
