//! Failure to response mapping.
//!
//! [`ErrorResolver::resolve`] never fails. Its layers, in order:
//!
//! 1. The configured error hook, if any. `Some(response)` is used, `None`
//!    falls through. An `Err` or a panic yields the default error.
//! 2. The built-in mapping: [`ValidationError`] to `ValidationFailed`,
//!    [`BuiltInError`] to its code, [`ApiError`] to its code and body,
//!    anything else to `UnknownError`.
//! 3. The chosen body is checked against its code's validator. A missing
//!    code, a malformed status or a mismatching body yields the default
//!    error.
//!
//! The default error itself is checked when the configuration is built, so
//! the last layer cannot fail. Diagnostics are logged, never sent.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::warn;

use crate::config::Config;
use crate::errors::{
    simple_error_body, ApiError, BuiltInError, ErrorCode, ErrorResponse, ValidationError,
};
use crate::hooks::{OnErrorEvent, PartialEvent};
use crate::logger::Logger;
use crate::route::RouteType;
use crate::server::{ApiRequest, ApiResponse};

/// Status used when not even the default error can be rendered.
const LAST_RESORT_STATUS: u16 = 500;

/// Maps any failure onto a configured error code.
pub struct ErrorResolver<'a, R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    config: &'a Config<R, E, C>,
}

impl<'a, R, E, C> ErrorResolver<'a, R, E, C>
where
    R: RouteType,
    E: ErrorCode,
    C: Send + Sync + 'static,
{
    pub fn new(config: &'a Config<R, E, C>) -> Self {
        Self { config }
    }

    /// Turn `error` into a response.
    pub async fn resolve(
        &self,
        request: &ApiRequest,
        logger: &Logger,
        error: &anyhow::Error,
        partial: &PartialEvent<R, C>,
    ) -> ApiResponse {
        logger.error("request failed", error);

        let candidate = match &self.config.handle_error {
            Some(hook) => {
                let event = OnErrorEvent {
                    request,
                    logger,
                    error,
                    partial,
                };
                match AssertUnwindSafe(hook.handle(&event)).catch_unwind().await {
                    Ok(Ok(Some(response))) => response,
                    Ok(Ok(None)) => self.builtin(error),
                    Ok(Err(hook_err)) => {
                        logger.error("error hook failed, using default error", &hook_err);
                        return self.default_response();
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(panic = %message, "error hook panicked, using default error");
                        return self.default_response();
                    }
                }
            }
            None => self.builtin(error),
        };

        if let Some(route) = &partial.route {
            let allowed = self
                .config
                .route_config(route.route_type())
                .map_or(true, |rc| rc.allows_error(&candidate.code));
            if !allowed {
                warn!(
                    code = %candidate.code,
                    route_type = %route.route_type(),
                    "error code is not enabled for this route type"
                );
            }
        }

        self.render(candidate)
    }

    /// The built-in mapping for a failure.
    #[must_use]
    pub fn builtin(&self, error: &anyhow::Error) -> ErrorResponse<E> {
        if let Some(validation) = error.downcast_ref::<ValidationError>() {
            let code = E::validation_failed();
            let body = validation.body(&code);
            return ErrorResponse::new(code, body);
        }
        if let Some(builtin) = error.downcast_ref::<BuiltInError>() {
            return ErrorResponse::simple(builtin.code.to_code::<E>());
        }
        if let Some(api) = error.downcast_ref::<ApiError<E>>() {
            return ErrorResponse::from(api.clone());
        }
        ErrorResponse::simple(E::unknown_error())
    }

    /// Check `candidate` against its code's config and build the response.
    fn render(&self, candidate: ErrorResponse<E>) -> ApiResponse {
        let Some(error_config) = self.config.error_config(&candidate.code) else {
            warn!(code = %candidate.code, "error code is not configured, using default error");
            return self.default_response();
        };
        let Some(status) = error_config.status_code() else {
            warn!(
                code = %candidate.code,
                status = %error_config.status,
                "error status is malformed, using default error"
            );
            return self.default_response();
        };
        if let Err(errors) = error_config.response_validator.safe_parse(&candidate.body) {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            warn!(
                code = %candidate.code,
                errors = ?details,
                "error body does not match its validator, using default error"
            );
            return self.default_response();
        }
        ApiResponse::new(status, candidate.body)
    }

    /// The configured default error.
    #[must_use]
    pub fn default_response(&self) -> ApiResponse {
        let default = &self.config.default_error;
        match self
            .config
            .error_config(&default.code)
            .and_then(|c| c.status_code())
        {
            Some(status) => ApiResponse::new(status, default.body.clone()),
            None => ApiResponse::new(
                LAST_RESORT_STATUS,
                simple_error_body(&E::unknown_error()),
            ),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
