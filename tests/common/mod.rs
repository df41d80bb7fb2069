#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use std::fmt;
use std::sync::{Arc, Mutex};

use typeroute::config::{simple_error_schema, ConfigBuilder, ErrorConfig, RouteConfig};
use typeroute::errors::{ApiError, ErrorCode};
use typeroute::hooks::{
    ContextParams, Lifecycle, OnHandlerEvent, OnRequestEvent, OnResponseEvent, OnRouteEvent,
};
use typeroute::{Api, ApiRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Public,
    User,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AppError {
    NotFound,
    ValidationFailed,
    UnknownError,
    Forbidden,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl ErrorCode for AppError {
    fn not_found() -> Self {
        AppError::NotFound
    }
    fn validation_failed() -> Self {
        AppError::ValidationFailed
    }
    fn unknown_error() -> Self {
        AppError::UnknownError
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctx {
    Anonymous,
    User { id: String },
}

pub type TestApi = Api<Kind, AppError, Ctx>;

pub fn forbidden() -> ApiError<AppError> {
    ApiError::new(AppError::Forbidden, json!({"error": "Forbidden"}))
}

/// Shared by both route types: an `authorization` header is required only
/// where the route type asks for it.
async fn context_from_header(p: ContextParams<Kind, Ctx>) -> anyhow::Result<Ctx> {
    if !p.authorization {
        return Ok(Ctx::Anonymous);
    }
    match p.request.header("authorization") {
        Some(token) => Ok(Ctx::User {
            id: token.to_string(),
        }),
        None => Err(anyhow::Error::from(forbidden())),
    }
}

pub fn public_config() -> RouteConfig<Kind, AppError, Ctx> {
    RouteConfig::new(context_from_header)
}

/// Two route types: `Public` with an anonymous context, and `User`, which
/// requires an `authorization` header and may answer `Forbidden`.
pub fn config_builder() -> ConfigBuilder<Kind, AppError, Ctx> {
    ConfigBuilder::new()
        .skip_descriptions_check(true)
        .route_type(Kind::Public, public_config())
        .route_type(
            Kind::User,
            RouteConfig::new(context_from_header)
            .authorization(true)
            .errors([
                AppError::NotFound,
                AppError::ValidationFailed,
                AppError::UnknownError,
                AppError::Forbidden,
            ]),
        )
        .error(
            AppError::Forbidden,
            ErrorConfig::new("403", "Forbidden", simple_error_schema("Forbidden").unwrap()),
        )
}

pub fn api() -> TestApi {
    Api::new(config_builder().build().unwrap())
}

pub fn get(url: &str) -> ApiRequest {
    ApiRequest::new(Method::GET, url)
}

pub fn post(url: &str, body: &Value) -> ApiRequest {
    ApiRequest::new(Method::POST, url).with_json(body)
}

/// Records the lifecycle stages it sees.
#[derive(Default)]
pub struct Recorder {
    stages: Mutex<Vec<&'static str>>,
}

impl Recorder {
    pub fn stages(&self) -> Vec<&'static str> {
        self.stages.lock().unwrap().clone()
    }

    fn push(&self, stage: &'static str) {
        self.stages.lock().unwrap().push(stage);
    }
}

#[async_trait]
impl Lifecycle<Kind, Ctx> for Recorder {
    async fn on_request(&self, _event: &OnRequestEvent<'_>) -> anyhow::Result<()> {
        self.push("request");
        Ok(())
    }

    async fn on_route(&self, _event: &OnRouteEvent<'_, Kind, Ctx>) -> anyhow::Result<()> {
        self.push("route");
        Ok(())
    }

    async fn on_handler(&self, _event: &OnHandlerEvent<'_, Kind, Ctx>) -> anyhow::Result<()> {
        self.push("handler");
        Ok(())
    }

    async fn on_response(&self, _event: &OnResponseEvent<'_, Kind, Ctx>) -> anyhow::Result<()> {
        self.push("response");
        Ok(())
    }
}

pub fn recorder() -> Arc<Recorder> {
    Arc::new(Recorder::default())
}
