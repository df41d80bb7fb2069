use anyhow::Context;
use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use crate::logger::Logger;
use crate::server::ApiRequest;
use crate::validator::{RouteValidator, Validators};

/// A route category tag selecting context, authorization and error policy.
///
/// Implemented for every type with the listed bounds; applications normally
/// use a small enum.
pub trait RouteType: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> RouteType for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{}

/// The route type of the default configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleRouteType {
    Public,
}

impl fmt::Display for SampleRouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleRouteType::Public => f.write_str("Public"),
        }
    }
}

/// What a handler produces: a JSON body plus response headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteResponse {
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl RouteResponse {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: BTreeMap::new(),
        }
    }

    /// Serialize a typed body.
    ///
    /// # Errors
    ///
    /// Fails if `body` cannot be represented as JSON.
    pub fn json<T: Serialize>(body: &T) -> anyhow::Result<Self> {
        let body = serde_json::to_value(body).context("response body is not serializable")?;
        Ok(Self::new(body))
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl From<Value> for RouteResponse {
    fn from(body: Value) -> Self {
        RouteResponse::new(body)
    }
}

/// Query, path and body after coercion and validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParams {
    pub query: Value,
    pub path: Value,
    pub body: Value,
}

impl ValidatedParams {
    /// Deserialize the validated query into a handler type.
    ///
    /// # Errors
    ///
    /// Fails when the validated shape does not fit `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_value(self.query.clone()).context("query params do not fit handler type")
    }

    /// Deserialize the validated path params into a handler type.
    ///
    /// # Errors
    ///
    /// Fails when the validated shape does not fit `T`.
    pub fn path_as<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_value(self.path.clone()).context("path params do not fit handler type")
    }

    /// Deserialize the validated body into a handler type.
    ///
    /// # Errors
    ///
    /// Fails when the validated shape does not fit `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_value(self.body.clone()).context("body does not fit handler type")
    }
}

/// Everything a handler receives.
pub struct HandlerContext<C> {
    pub params: ValidatedParams,
    pub context: Arc<C>,
    pub request: Arc<ApiRequest>,
    pub logger: Logger,
}

/// A route handler.
///
/// Closures are adapted with [`RouteBuilder::handler`](super::RouteBuilder::handler);
/// implement the trait directly for handlers that carry state.
#[async_trait]
pub trait Handler<C>: Send + Sync + 'static {
    async fn call(&self, ctx: HandlerContext<C>) -> anyhow::Result<RouteResponse>;
}

/// Adapts an async closure into a [`Handler`].
pub(crate) struct FnHandler<F>(pub(crate) F);

#[async_trait]
impl<C, F, Fut, T> Handler<C> for FnHandler<F>
where
    C: Send + Sync + 'static,
    F: Fn(HandlerContext<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Into<RouteResponse> + Send + 'static,
{
    async fn call(&self, ctx: HandlerContext<C>) -> anyhow::Result<RouteResponse> {
        (self.0)(ctx).await.map(Into::into)
    }
}

/// An immutable route descriptor.
///
/// Created through [`RouteFactory`](super::RouteFactory), which checks it
/// against the active configuration and compiles its validators. The only
/// derivation is [`Route::with_path_prefix`], which returns a copy.
pub struct Route<R, C> {
    pub(crate) route_type: R,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) description: String,
    pub(crate) validators: Validators,
    pub(crate) compiled: RouteValidator,
    pub(crate) extra: Map<String, Value>,
    pub(crate) handler: Arc<dyn Handler<C>>,
}

impl<R: Clone, C> Clone for Route<R, C> {
    fn clone(&self) -> Self {
        Self {
            route_type: self.route_type.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
            description: self.description.clone(),
            validators: self.validators.clone(),
            compiled: self.compiled.clone(),
            extra: self.extra.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R: fmt::Debug, C> fmt::Debug for Route<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("route_type", &self.route_type)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<R: Clone, C> Route<R, C> {
    #[must_use]
    pub fn route_type(&self) -> &R {
        &self.route_type
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template with `{name}` placeholders.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The schemas as declared.
    #[must_use]
    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    #[must_use]
    pub fn validator(&self) -> &RouteValidator {
        &self.compiled
    }

    /// Route-type specific properties (e.g. a `permission` string).
    #[must_use]
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler<C>> {
        &self.handler
    }

    /// Copy of this route mounted under `prefix`.
    #[must_use]
    pub fn with_path_prefix(&self, prefix: &str) -> Self {
        let mut route = self.clone();
        route.path = format!("{prefix}{}", self.path);
        route
    }
}
