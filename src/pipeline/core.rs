use futures::FutureExt;
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

use crate::config::{Config, Server};
use crate::errors::{BuiltInError, ErrorCode};
use crate::hooks::{
    ContextParams, DecodedRequest, HandlerThunk, OnHandlerEvent, OnRequestEvent, OnResponseEvent,
    OnRouteEvent, PartialEvent,
};
use crate::ids::RequestId;
use crate::logger::Logger;
use crate::registry::{RegistryError, RouteRegistry};
use crate::resolver::{panic_message, ErrorResolver};
use crate::route::{HandlerContext, Route, RouteBuilder, RouteError, RouteType, ValidatedParams};
use crate::server::{ApiRequest, ApiResponse};

/// Status of every successful response.
const OK_STATUS: u16 = 200;

/// An application: configuration plus registered routes.
///
/// Register routes during setup, then share the `Api` (for example behind an
/// `Arc`) and call [`Api::process_request`] for each request. Processing only
/// reads the configuration and the route table.
pub struct Api<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    config: Config<R, E, C>,
    registry: RouteRegistry<R, C>,
}

impl<R, E, C> Api<R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    pub fn new(config: Config<R, E, C>) -> Self {
        let registry = RouteRegistry::new(!config.skip_descriptions_check);
        Self { config, registry }
    }

    #[must_use]
    pub fn config(&self) -> &Config<R, E, C> {
        &self.config
    }

    #[must_use]
    pub fn servers(&self) -> &[Server] {
        &self.config.servers
    }

    /// Check a route definition against this configuration.
    ///
    /// # Errors
    ///
    /// See [`RouteError`].
    pub fn create_route(&self, builder: RouteBuilder<R, C>) -> Result<Route<R, C>, RouteError> {
        self.config.factory().create(builder)
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::Lint`] when the description check rejects
    /// the route.
    pub fn add_route(&mut self, route: Route<R, C>) -> Result<(), RegistryError> {
        self.registry.add_route(route)
    }

    /// Mount copies of `routes` under `prefix`.
    ///
    /// # Errors
    ///
    /// Stops at the first route the description check rejects.
    pub fn add_routes<'r, I>(&mut self, prefix: &str, routes: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = &'r Route<R, C>>,
    {
        self.registry.add_routes(prefix, routes)
    }

    /// Mount several route groups.
    ///
    /// # Errors
    ///
    /// Stops at the first route the description check rejects.
    pub fn add_route_map<'r, M, I>(&mut self, map: M) -> Result<(), RegistryError>
    where
        M: IntoIterator<Item = (&'r str, I)>,
        I: IntoIterator<Item = &'r Route<R, C>>,
    {
        self.registry.add_route_map(map)
    }

    /// Registered routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route<R, C>>> {
        self.registry.routes()
    }

    /// Run one request through the pipeline.
    ///
    /// Always produces a response: every failure, including a panic in user
    /// code, is turned into a configured error response.
    pub async fn process_request(&self, request: ApiRequest) -> ApiResponse {
        let request_id = RequestId::from_headers(&request.headers);
        let span = info_span!(
            "request",
            method = %request.method,
            path = %request.path(),
            request_id = %request_id
        );
        let logger = self.config.logger.extend(&request_id.to_string());
        let request = Arc::new(request);

        async move {
            let started = Instant::now();
            let mut partial = PartialEvent::default();

            let outcome = AssertUnwindSafe(self.run(&request, &logger, &mut partial))
                .catch_unwind()
                .await;
            let response = match outcome {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => self.resolve_error(&request, &logger, &err, &partial).await,
                Err(payload) => {
                    let err = anyhow::Error::new(BuiltInError::unknown(format!(
                        "panic: {}",
                        panic_message(payload.as_ref())
                    )));
                    self.resolve_error(&request, &logger, &err, &partial).await
                }
            };

            info!(
                status = response.status,
                latency_us = started.elapsed().as_micros() as u64,
                "Request completed"
            );
            response
        }
        .instrument(span)
        .await
    }

    async fn resolve_error(
        &self,
        request: &ApiRequest,
        logger: &Logger,
        err: &anyhow::Error,
        partial: &PartialEvent<R, C>,
    ) -> ApiResponse {
        ErrorResolver::new(&self.config)
            .resolve(request, logger, err, partial)
            .await
    }

    /// The ordered stages. Each records what it built into `partial` so a
    /// failure can be resolved with that context.
    async fn run(
        &self,
        request: &Arc<ApiRequest>,
        logger: &Logger,
        partial: &mut PartialEvent<R, C>,
    ) -> anyhow::Result<ApiResponse> {
        let hooks = &self.config.hooks;

        let event = OnRequestEvent { request, logger };
        for hook in hooks {
            hook.on_request(&event).await?;
        }

        // Resolve
        let not_found =
            || BuiltInError::not_found(format!("{} {}", request.method, request.path()));
        let path = strip_base_path(&self.config.base_path, request.path()).ok_or_else(not_found)?;
        let resolved = self
            .registry
            .resolve(&request.method, path)
            .ok_or_else(not_found)?;
        let route = resolved.route;
        partial.route = Some(Arc::clone(&route));

        // Decode
        let decoded = DecodedRequest {
            path: path.to_string(),
            method: request.method.clone(),
            params: resolved
                .path_params
                .into_iter()
                .map(|(name, value)| (name.to_string(), Value::String(value)))
                .collect::<Map<String, Value>>(),
            query: request.query_params(),
            body: request.json_body(),
        };
        partial.decoded = Some(decoded.clone());
        debug!(route = %route.path(), "Request decoded");

        let event = OnRouteEvent {
            request,
            logger,
            route: &route,
            decoded: &decoded,
        };
        for hook in hooks {
            hook.on_route(&event).await?;
        }

        // Validate: query first, then path, then body
        let validator = route.validator();
        let query = validator.validate_query(&decoded.query)?;
        let path_params = validator.validate_path(&decoded.params)?;
        let body = validator.validate_body(&decoded.method, &decoded.body)?;
        let validated = ValidatedParams {
            query,
            path: path_params,
            body,
        };
        partial.validated = Some(validated.clone());

        // Context
        let route_config = self.config.route_config(route.route_type()).ok_or_else(|| {
            BuiltInError::unknown(format!(
                "route type '{}' has no configuration",
                route.route_type()
            ))
        })?;
        let params = ContextParams {
            route: Arc::clone(&route),
            authorization: route_config.authorization,
            request: Arc::clone(request),
            logger: logger.clone(),
            params: validated.clone(),
        };
        let context = Arc::new(route_config.context_factory.create(params.clone()).await?);

        let event = OnHandlerEvent {
            request,
            logger,
            route: &route,
            decoded: &decoded,
            validated: &validated,
        };
        for hook in hooks {
            hook.on_handler(&event).await?;
        }

        // Handler, optionally wrapped
        let handler = Arc::clone(route.handler());
        let handler_ctx = HandlerContext {
            params: validated.clone(),
            context: Arc::clone(&context),
            request: Arc::clone(request),
            logger: logger.clone(),
        };
        let thunk: HandlerThunk = Box::pin(async move { handler.call(handler_ctx).await });
        let result = match &route_config.handler_wrapper {
            Some(wrapper) => wrapper.wrap(thunk, params, context).await?,
            None => thunk.await?,
        };

        if self.config.validate_responses {
            validator.validate_response(&result.body, &result.headers)?;
        }
        let response = ApiResponse::new(OK_STATUS, result.body).with_headers(result.headers);
        partial.response = Some(response.clone());

        let event = OnResponseEvent {
            request,
            logger,
            route: &route,
            decoded: &decoded,
            validated: &validated,
            response: &response,
        };
        for hook in hooks {
            hook.on_response(&event).await?;
        }

        Ok(response)
    }
}

/// The request path relative to `base_path`, or `None` if the request is
/// outside it. Only whole segments are stripped: `/api` matches `/api` and
/// `/api/x`, never `/apix`.
pub(crate) fn strip_base_path<'p>(base_path: &str, path: &'p str) -> Option<&'p str> {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
