use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::logger::Logger;
use crate::route::{Handler, HandlerContext, RouteResponse};
use crate::server::ApiRequest;

/// Validated request data in handler-defined types.
pub struct TypedRequest<Q, P, B, C> {
    pub query: Q,
    pub path: P,
    pub body: B,
    pub context: Arc<C>,
    pub request: Arc<ApiRequest>,
    pub logger: Logger,
}

/// A handler working on typed params instead of JSON values.
///
/// The pipeline validates against the route's schemas first, then the
/// validated values are deserialized into the associated types. A
/// deserialization failure at that point means the types and the schemas
/// disagree and is answered with `UnknownError`.
///
/// Use `()`-like types that accept `{}` (for example an empty struct) for
/// parts the route does not declare.
#[async_trait]
pub trait TypedHandler<C>: Send + Sync + 'static
where
    C: Send + Sync + 'static,
{
    type Query: DeserializeOwned + Send;
    type Path: DeserializeOwned + Send;
    type Body: DeserializeOwned + Send;
    type Response: Serialize + Send;

    async fn handle(
        &self,
        req: TypedRequest<Self::Query, Self::Path, Self::Body, C>,
    ) -> anyhow::Result<Self::Response>;
}

struct TypedAdapter<H>(H);

#[async_trait]
impl<C, H> Handler<C> for TypedAdapter<H>
where
    C: Send + Sync + 'static,
    H: TypedHandler<C>,
{
    async fn call(&self, ctx: HandlerContext<C>) -> anyhow::Result<RouteResponse> {
        let req = TypedRequest {
            query: ctx.params.query_as()?,
            path: ctx.params.path_as()?,
            body: ctx.params.body_as()?,
            context: ctx.context,
            request: ctx.request,
            logger: ctx.logger,
        };
        let response = self.0.handle(req).await?;
        RouteResponse::json(&response)
    }
}

/// Adapt a [`TypedHandler`] for
/// [`RouteBuilder::handler_arc`](crate::route::RouteBuilder::handler_arc).
pub fn typed_handler<C, H>(handler: H) -> Arc<dyn Handler<C>>
where
    C: Send + Sync + 'static,
    H: TypedHandler<C>,
{
    Arc::new(TypedAdapter(handler))
}
