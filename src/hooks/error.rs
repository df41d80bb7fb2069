use async_trait::async_trait;

use super::core::PartialEvent;
use crate::errors::ErrorResponse;
use crate::logger::Logger;
use crate::route::RouteType;
use crate::server::ApiRequest;

/// Passed to the error hook.
pub struct OnErrorEvent<'a, R, C> {
    pub request: &'a ApiRequest,
    pub logger: &'a Logger,
    pub error: &'a anyhow::Error,
    pub partial: &'a PartialEvent<R, C>,
}

/// Turns a pipeline failure into an error response.
///
/// Return `Ok(Some(..))` to answer with a configured error code, `Ok(None)` to
/// fall through to the built-in mapping. An `Err` or a panic here is logged
/// and answered with the configured default error. The returned body is
/// checked against its code's validator; a mismatch also yields the default
/// error.
#[async_trait]
pub trait ErrorHandler<R, E, C>: Send + Sync
where
    R: RouteType,
    E: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    async fn handle(
        &self,
        event: &OnErrorEvent<'_, R, C>,
    ) -> anyhow::Result<Option<ErrorResponse<E>>>;
}

pub(crate) struct FnErrorHandler<F>(pub(crate) F);

#[async_trait]
impl<R, E, C, F> ErrorHandler<R, E, C> for FnErrorHandler<F>
where
    R: RouteType,
    E: Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: for<'a, 'b> Fn(&'a OnErrorEvent<'b, R, C>) -> anyhow::Result<Option<ErrorResponse<E>>>
        + Send
        + Sync,
{
    async fn handle(
        &self,
        event: &OnErrorEvent<'_, R, C>,
    ) -> anyhow::Result<Option<ErrorResponse<E>>> {
        (self.0)(event)
    }
}
