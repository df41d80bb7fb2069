use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::logger::Logger;
use crate::route::{Route, RouteResponse, RouteType, ValidatedParams};
use crate::server::ApiRequest;

/// Input to a context factory and a handler wrapper.
pub struct ContextParams<R, C> {
    pub route: Arc<Route<R, C>>,
    /// The route type's `authorization` flag; factories that see `true`
    /// must establish a caller or fail.
    pub authorization: bool,
    pub request: Arc<ApiRequest>,
    pub logger: Logger,
    pub params: ValidatedParams,
}

impl<R, C> Clone for ContextParams<R, C> {
    fn clone(&self) -> Self {
        Self {
            route: Arc::clone(&self.route),
            authorization: self.authorization,
            request: Arc::clone(&self.request),
            logger: self.logger.clone(),
            params: self.params.clone(),
        }
    }
}

/// Builds the per-request context for one route type.
///
/// Errors become `UnknownError` responses unless they are an
/// [`ApiError`](crate::errors::ApiError).
#[async_trait]
pub trait ContextFactory<R, C>: Send + Sync
where
    R: RouteType,
    C: Send + Sync + 'static,
{
    async fn create(&self, params: ContextParams<R, C>) -> anyhow::Result<C>;
}

pub(crate) struct FnContextFactory<F>(pub(crate) F);

#[async_trait]
impl<R, C, F, Fut> ContextFactory<R, C> for FnContextFactory<F>
where
    R: RouteType,
    C: Send + Sync + 'static,
    F: Fn(ContextParams<R, C>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<C>> + Send + 'static,
{
    async fn create(&self, params: ContextParams<R, C>) -> anyhow::Result<C> {
        (self.0)(params).await
    }
}

/// The handler invocation, not yet started. Awaiting it runs the handler;
/// dropping it skips the handler.
pub type HandlerThunk = BoxFuture<'static, anyhow::Result<RouteResponse>>;

/// Intercepts every handler call of one route type.
///
/// ```rust,ignore
/// struct Timing;
///
/// #[async_trait]
/// impl HandlerWrapper<Kind, Ctx> for Timing {
///     async fn wrap(&self, next: HandlerThunk, params: ContextParams<Kind, Ctx>, _ctx: Arc<Ctx>)
///         -> anyhow::Result<RouteResponse>
///     {
///         let started = Instant::now();
///         let res = next.await;
///         params.logger.debug(&format!("handler took {:?}", started.elapsed()));
///         res
///     }
/// }
/// ```
#[async_trait]
pub trait HandlerWrapper<R, C>: Send + Sync
where
    R: RouteType,
    C: Send + Sync + 'static,
{
    async fn wrap(
        &self,
        next: HandlerThunk,
        params: ContextParams<R, C>,
        context: Arc<C>,
    ) -> anyhow::Result<RouteResponse>;
}
