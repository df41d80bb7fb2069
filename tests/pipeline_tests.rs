#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use async_trait::async_trait;
use common::*;
use http::Method;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use typeroute::errors::ErrorResponse;
use typeroute::hooks::{ContextParams, HandlerThunk, HandlerWrapper, Lifecycle, OnRouteEvent};
use typeroute::{ApiRequest, Route, RouteResponse};

fn route(kind: Kind, method: Method, path: &str) -> typeroute::route::RouteBuilder<Kind, Ctx> {
    Route::builder(kind, method, path).description("Route used by pipeline tests")
}

fn number_path() -> Value {
    json!({
        "type": "object",
        "properties": {"id": {"type": "number"}},
        "required": ["id"]
    })
}

#[tokio::test]
async fn test_string_response() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/test")
                .response_schema(json!({"type": "string"}))
                .handler(|_ctx| async { Ok(json!("1")) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/test")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!("1"));
}

#[tokio::test]
async fn test_invalid_path_param() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/{id}")
                .path_schema(number_path())
                .handler(|ctx| async move { Ok(ctx.params.path.clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/check")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["code"], "ValidationFailed");
    assert_eq!(res.body["error"]["location"], "Path");
    assert_eq!(res.body["error"]["fieldErrors"][0]["field"], "id");

    let res = api.process_request(get("/api/12.5")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"id": 12.5}));
}

#[tokio::test]
async fn test_repeated_query_becomes_array() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/")
                .query_schema(json!({
                    "type": "object",
                    "properties": {"ids": {"type": "array", "items": {"type": "number"}}},
                    "required": ["ids"]
                }))
                .handler(|ctx| async move { Ok(ctx.params.query["ids"].clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/?ids=1&ids=2&ids=3")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!([1, 2, 3]));

    // A lone value is still an array.
    let res = api.process_request(get("/api?ids=4")).await;
    assert_eq!(res.body, json!([4]));

    let res = api.process_request(get("/api?ids=1&ids=007")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["location"], "Query");
    assert_eq!(res.body["error"]["fieldErrors"][0]["field"], "ids.1");
}

#[tokio::test]
async fn test_unregistered_path_is_not_found() {
    let api = api();
    let res = api.process_request(get("/api/nowhere")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body, json!({"error": "NotFound"}));

    // Outside the base path entirely.
    let res = api.process_request(get("/other/nowhere")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_base_path_is_segment_aligned() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/test").handler(|_ctx| async { Ok(json!(true)) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    assert_eq!(api.process_request(get("/api/test")).await.status, 200);
    assert_eq!(api.process_request(get("/apitest")).await.status, 404);
    assert_eq!(api.process_request(get("/test")).await.status, 404);
}

#[tokio::test]
async fn test_handler_error_is_unknown_error() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/fail")
                .handler(|_ctx| async { Err::<Value, _>(anyhow::anyhow!("database is down")) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/fail")).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.body, json!({"error": "UnknownError"}));
    assert!(!res.body.to_string().contains("database"));
}

#[tokio::test]
async fn test_handler_panic_is_unknown_error() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/panic").handler(|_ctx| async {
                if true {
                    panic!("handler bug");
                }
                Ok(json!(null))
            }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/panic")).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.body, json!({"error": "UnknownError"}));
}

#[tokio::test]
async fn test_throwing_error_hook_yields_default_error() {
    let config = config_builder()
        .default_error(ErrorResponse::new(
            AppError::Forbidden,
            json!({"error": "Forbidden"}),
        ))
        .handle_error_fn(|_event| Err(anyhow::anyhow!("error hook is broken")))
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/fail")
                .handler(|_ctx| async { Err::<Value, _>(anyhow::anyhow!("boom")) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/fail")).await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body, json!({"error": "Forbidden"}));

    // Route misses go through the same hook.
    let res = api.process_request(get("/api/missing")).await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn test_error_hook_with_invalid_body_yields_default_error() {
    let config = config_builder()
        .handle_error_fn(|_event| {
            Ok(Some(ErrorResponse::new(
                AppError::Forbidden,
                json!({"reason": "no error field"}),
            )))
        })
        .build()
        .unwrap();
    let api = typeroute::Api::new(config);

    let res = api.process_request(get("/api/missing")).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.body, json!({"error": "UnknownError"}));
}

#[tokio::test]
async fn test_error_hook_sees_partial_event() {
    let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let config = config_builder()
        .handle_error_fn(move |event| {
            sink.lock()
                .unwrap()
                .push((event.partial.route.is_some(), event.partial.validated.is_some()));
            Ok(Some(ErrorResponse::new(
                AppError::Forbidden,
                json!({"error": "Forbidden"}),
            )))
        })
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/fail")
                .handler(|_ctx| async { Err::<Value, _>(anyhow::anyhow!("boom")) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    assert_eq!(api.process_request(get("/api/missing")).await.status, 403);
    assert_eq!(api.process_request(get("/api/fail")).await.status, 403);
    assert_eq!(*seen.lock().unwrap(), vec![(false, false), (true, true)]);
}

#[tokio::test]
async fn test_error_hook_none_falls_through() {
    let config = config_builder()
        .handle_error_fn(|_event| Ok(None))
        .build()
        .unwrap();
    let api = typeroute::Api::new(config);
    let res = api.process_request(get("/api/missing")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body, json!({"error": "NotFound"}));
}

#[tokio::test]
async fn test_route_map_prefixes_are_isolated() {
    let mut api = api();
    let one = api
        .create_route(route(Kind::Public, Method::GET, "/one").handler(|_| async { Ok(json!("A")) }))
        .unwrap();
    let two = api
        .create_route(route(Kind::Public, Method::GET, "/two").handler(|_| async { Ok(json!("B")) }))
        .unwrap();
    let three = api
        .create_route(
            route(Kind::Public, Method::GET, "/three").handler(|_| async { Ok(json!("C")) }),
        )
        .unwrap();
    api.add_route_map([("/path1", vec![&one, &three]), ("/path2", vec![&two])])
        .unwrap();

    assert_eq!(api.process_request(get("/api/path1/one")).await.body, json!("A"));
    assert_eq!(api.process_request(get("/api/path1/three")).await.body, json!("C"));
    assert_eq!(api.process_request(get("/api/path2/two")).await.body, json!("B"));

    let res = api.process_request(get("/api/path1/two")).await;
    assert_eq!(res.status, 404);
    assert_eq!(one.path(), "/one");
}

#[tokio::test]
async fn test_query_is_validated_before_path() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/{id}")
                .path_schema(number_path())
                .query_schema(json!({
                    "type": "object",
                    "properties": {"flag": {"type": "boolean"}}
                }))
                .handler(|_| async { Ok(json!(null)) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/abc?flag=yes")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["location"], "Query");

    let res = api.process_request(get("/api/abc?flag=true")).await;
    assert_eq!(res.body["error"]["location"], "Path");
}

#[tokio::test]
async fn test_unknown_query_key_is_rejected() {
    let mut api = api();
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/list").handler(|ctx| async move {
            Ok(ctx.params.query.clone())
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/list")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({}));

    // Without a query schema no query key is allowed.
    let res = api.process_request(get("/api/list?x=1")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["code"], "ValidationFailed");
    assert_eq!(res.body["error"]["location"], "Query");
    assert_eq!(res.body["error"]["fieldErrors"][0]["field"], "x");

    let mut api = common::api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/list")
                .query_schema(json!({
                    "type": "object",
                    "properties": {
                        "page": {"type": "integer", "default": 1},
                        "q": {"type": "string"}
                    }
                }))
                .handler(|ctx| async move { Ok(ctx.params.query.clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/list?q=cats")).await;
    assert_eq!(res.body, json!({"page": 1, "q": "cats"}));

    let res = api.process_request(get("/api/list?x=1")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["location"], "Query");
}

#[tokio::test]
async fn test_body_is_strict() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::POST, "/pets")
                .body_schema(json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }))
                .handler(|ctx| async move { Ok(ctx.params.body.clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(post("/api/pets", &json!({"name": "Rex"}))).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"name": "Rex"}));

    let res = api
        .process_request(post("/api/pets", &json!({"name": "Rex", "age": 3})))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["location"], "Body");
    assert_eq!(
        res.body["error"]["fieldErrors"][0],
        json!({"field": "age", "message": "Unrecognized key"})
    );

    // Unparsable JSON decodes to {} and then fails the schema.
    let res = api
        .process_request(ApiRequest::new(Method::POST, "/api/pets").with_body("{not json"))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(
        res.body["error"]["fieldErrors"][0],
        json!({"field": "name", "message": "Required"})
    );
}

#[tokio::test]
async fn test_get_body_is_ignored() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/echo")
                .handler(|ctx| async move { Ok(ctx.params.body.clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let req = get("/api/echo").with_json(&json!({"sneaky": true}));
    let res = api.process_request(req).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({}));
}

#[tokio::test]
async fn test_response_validation() {
    let build = |validate: bool| {
        let mut api = typeroute::Api::new(
            config_builder().validate_responses(validate).build().unwrap(),
        );
        let r = api
            .create_route(
                route(Kind::Public, Method::GET, "/count")
                    .response_schema(json!({"type": "integer"}))
                    .handler(|_| async { Ok(json!("not a number")) }),
            )
            .unwrap();
        api.add_route(r).unwrap();
        api
    };

    let res = build(true).process_request(get("/api/count")).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["location"], "Response");
    assert_eq!(res.body["error"]["fieldErrors"][0]["field"], "body");

    let res = build(false).process_request(get("/api/count")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!("not a number"));
}

#[tokio::test]
async fn test_response_headers() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/tagged")
                .response_headers_schema(json!({
                    "type": "object",
                    "properties": {"etag": {"type": "string", "pattern": "^v[0-9]+$"}},
                    "required": ["etag"]
                }))
                .handler(|ctx| async move {
                    let etag = ctx.request.header("x-version").unwrap_or("v1").to_string();
                    Ok(RouteResponse::new(json!("ok")).with_header("etag", etag))
                }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/tagged")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.headers["etag"], "v1");

    let res = api
        .process_request(get("/api/tagged").with_header("X-Version", "latest"))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"]["fieldErrors"][0]["field"], "headers.etag");
}

#[tokio::test]
async fn test_lifecycle_order() {
    let rec = recorder();
    let mut api = typeroute::Api::new(config_builder().hook(Arc::clone(&rec) as _).build().unwrap());
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/{id}")
                .path_schema(number_path())
                .handler(|_| async { Ok(json!(null)) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    api.process_request(get("/api/1")).await;
    assert_eq!(rec.stages(), vec!["request", "route", "handler", "response"]);

    let rec = recorder();
    let mut api = typeroute::Api::new(config_builder().hook(Arc::clone(&rec) as _).build().unwrap());
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/{id}")
                .path_schema(number_path())
                .handler(|_| async { Ok(json!(null)) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/nope")).await;
    assert_eq!(res.status, 400);
    assert_eq!(rec.stages(), vec!["request", "route"]);
}

struct RejectRoutes;

#[async_trait]
impl Lifecycle<Kind, Ctx> for RejectRoutes {
    async fn on_route(&self, event: &OnRouteEvent<'_, Kind, Ctx>) -> anyhow::Result<()> {
        anyhow::bail!("route {} rejected", event.route.path())
    }
}

#[tokio::test]
async fn test_failing_hook_is_unknown_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut api = typeroute::Api::new(
        config_builder()
            .hook(Arc::new(RejectRoutes))
            .build()
            .unwrap(),
    );
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/x").handler(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!(null))
            }
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/x")).await;
    assert_eq!(res.status, 500);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_context_factory() {
    let mut api = api();
    let r = api
        .create_route(route(Kind::User, Method::GET, "/me").handler(|ctx| async move {
            match ctx.context.as_ref() {
                Ctx::User { id } => Ok(json!({"id": id})),
                Ctx::Anonymous => Ok(json!(null)),
            }
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/me")).await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body, json!({"error": "Forbidden"}));

    let res = api
        .process_request(get("/api/me").with_header("Authorization", "alice"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"id": "alice"}));
}

#[tokio::test]
async fn test_context_factory_sees_authorization_flag() {
    let config = config_builder()
        .route_type(Kind::Public, public_config().authorization(true))
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/x").handler(|ctx| async move {
            Ok(json!(matches!(ctx.context.as_ref(), Ctx::User { .. })))
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/x")).await;
    assert_eq!(res.status, 403);

    let res = api
        .process_request(get("/api/x").with_header("authorization", "dave"))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!(true));
}

#[tokio::test]
async fn test_context_factory_error_is_unknown_error() {
    let config = config_builder()
        .route_type(
            Kind::Public,
            typeroute::RouteConfig::new(|_| async { Err::<Ctx, _>(anyhow::anyhow!("no db")) }),
        )
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/x").handler(|_| async { Ok(json!(1)) }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/x")).await;
    assert_eq!(res.status, 500);
    assert_eq!(res.body, json!({"error": "UnknownError"}));
}

#[tokio::test]
async fn test_handler_can_raise_configured_error() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::User, Method::DELETE, "/pets/{id}")
                .path_schema(number_path())
                .handler(|_| async { Err::<Value, _>(anyhow::Error::from(forbidden())) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api
        .process_request(
            ApiRequest::new(Method::DELETE, "/api/pets/1").with_header("authorization", "bob"),
        )
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.body, json!({"error": "Forbidden"}));
}

struct Cached;

#[async_trait]
impl HandlerWrapper<Kind, Ctx> for Cached {
    async fn wrap(
        &self,
        _next: HandlerThunk,
        _params: ContextParams<Kind, Ctx>,
        _context: Arc<Ctx>,
    ) -> anyhow::Result<RouteResponse> {
        Ok(RouteResponse::new(json!("cached")))
    }
}

struct Stamp;

#[async_trait]
impl HandlerWrapper<Kind, Ctx> for Stamp {
    async fn wrap(
        &self,
        next: HandlerThunk,
        params: ContextParams<Kind, Ctx>,
        _context: Arc<Ctx>,
    ) -> anyhow::Result<RouteResponse> {
        let res = next.await?;
        Ok(res.with_header("x-route", params.route.path()))
    }
}

#[tokio::test]
async fn test_handler_wrapper_can_short_circuit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let config = config_builder()
        .route_type(Kind::Public, public_config().handler_wrapper(Arc::new(Cached)))
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/slow").handler(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fresh"))
            }
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/slow")).await;
    assert_eq!(res.body, json!("cached"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_handler_wrapper_can_decorate() {
    let config = config_builder()
        .route_type(Kind::Public, public_config().handler_wrapper(Arc::new(Stamp)))
        .build()
        .unwrap();
    let mut api = typeroute::Api::new(config);
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/hello").handler(|_| async { Ok(json!("hi")) }))
        .unwrap();
    api.add_routes("/v1", [&r]).unwrap();

    let res = api.process_request(get("/api/v1/hello")).await;
    assert_eq!(res.body, json!("hi"));
    assert_eq!(res.headers["x-route"], "/v1/hello");
}

#[tokio::test]
async fn test_request_id_reaches_handler_logger() {
    let mut api = api();
    let r = api
        .create_route(route(Kind::Public, Method::GET, "/whoami").handler(|ctx| async move {
            Ok(json!(ctx.logger.invoker()))
        }))
        .unwrap();
    api.add_route(r).unwrap();

    let id = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    let res = api
        .process_request(get("/api/whoami").with_header("X-Request-Id", id))
        .await;
    assert_eq!(res.body, json!(format!("typeroute:{id}")));
}

#[tokio::test]
async fn test_percent_encoded_path_param() {
    let mut api = api();
    let r = api
        .create_route(
            route(Kind::Public, Method::GET, "/files/{name}")
                .path_schema(json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }))
                .handler(|ctx| async move { Ok(ctx.params.path["name"].clone()) }),
        )
        .unwrap();
    api.add_route(r).unwrap();

    let res = api.process_request(get("/api/files/annual%20report")).await;
    assert_eq!(res.body, json!("annual report"));
}

#[tokio::test]
async fn test_description_check_blocks_registration() {
    let mut api = typeroute::Api::new(
        config_builder().skip_descriptions_check(false).build().unwrap(),
    );
    let r = api
        .create_route(
            Route::builder(Kind::Public, Method::GET, "/x")
                .description("x")
                .handler(|_| async { Ok(json!(null)) }),
        )
        .unwrap();
    let err = api.add_route(r).unwrap_err();
    assert!(err.to_string().contains("Description for /x is missing or too small"));
    assert_eq!(api.routes().count(), 0);
}
