use http::Method;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

use super::core::{FnHandler, Handler, HandlerContext, RouteResponse};
use crate::schema::{Schema, SchemaError};

/// Anything a route schema can be given as: a compiled [`Schema`] or a raw
/// JSON Schema document.
pub trait IntoSchema {
    /// # Errors
    ///
    /// Fails when a raw document does not compile.
    fn into_schema(self) -> Result<Schema, SchemaError>;
}

impl IntoSchema for Schema {
    fn into_schema(self) -> Result<Schema, SchemaError> {
        Ok(self)
    }
}

impl IntoSchema for &Schema {
    fn into_schema(self) -> Result<Schema, SchemaError> {
        Ok(self.clone())
    }
}

impl IntoSchema for Value {
    fn into_schema(self) -> Result<Schema, SchemaError> {
        Schema::new(self)
    }
}

type PendingSchema = Option<Result<Schema, SchemaError>>;

/// Collects a route definition for [`RouteFactory::create`](super::RouteFactory::create).
///
/// ```rust,ignore
/// let route = api.create_route(
///     Route::builder(RouteKind::User, Method::GET, "/pets/{id}")
///         .description("Fetch a single pet by id")
///         .path_schema(json!({
///             "type": "object",
///             "properties": {"id": {"type": "integer", "description": "Pet id"}},
///             "required": ["id"]
///         }))
///         .response_schema(pet_schema)
///         .extra("permission", json!("pets:read"))
///         .handler(|ctx| async move { load_pet(ctx.params.path_as()?).await }),
/// )?;
/// ```
pub struct RouteBuilder<R, C> {
    pub(crate) route_type: R,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) description: String,
    pub(crate) path_schema: PendingSchema,
    pub(crate) query_schema: PendingSchema,
    pub(crate) body_schema: PendingSchema,
    pub(crate) response_schema: PendingSchema,
    pub(crate) response_headers_schema: PendingSchema,
    pub(crate) extra: Map<String, Value>,
    pub(crate) handler: Option<Arc<dyn Handler<C>>>,
}

impl<R, C: Send + Sync + 'static> RouteBuilder<R, C> {
    pub fn new(route_type: R, method: Method, path: impl Into<String>) -> Self {
        Self {
            route_type,
            method,
            path: path.into(),
            description: String::new(),
            path_schema: None,
            query_schema: None,
            body_schema: None,
            response_schema: None,
            response_headers_schema: None,
            extra: Map::new(),
            handler: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn path_schema(mut self, schema: impl IntoSchema) -> Self {
        self.path_schema = Some(schema.into_schema());
        self
    }

    #[must_use]
    pub fn query_schema(mut self, schema: impl IntoSchema) -> Self {
        self.query_schema = Some(schema.into_schema());
        self
    }

    /// Not allowed on GET routes.
    #[must_use]
    pub fn body_schema(mut self, schema: impl IntoSchema) -> Self {
        self.body_schema = Some(schema.into_schema());
        self
    }

    #[must_use]
    pub fn response_schema(mut self, schema: impl IntoSchema) -> Self {
        self.response_schema = Some(schema.into_schema());
        self
    }

    #[must_use]
    pub fn response_headers_schema(mut self, schema: impl IntoSchema) -> Self {
        self.response_headers_schema = Some(schema.into_schema());
        self
    }

    /// Set one route-type specific property.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Use an async closure as the handler.
    #[must_use]
    pub fn handler<F, Fut, T>(mut self, handler: F) -> Self
    where
        F: Fn(HandlerContext<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Into<RouteResponse> + Send + 'static,
    {
        self.handler = Some(Arc::new(FnHandler(handler)));
        self
    }

    /// Use a shared handler implementation.
    #[must_use]
    pub fn handler_arc(mut self, handler: Arc<dyn Handler<C>>) -> Self {
        self.handler = Some(handler);
        self
    }
}

impl<R, C: Send + Sync + 'static> super::core::Route<R, C> {
    /// Start a route definition.
    pub fn builder(route_type: R, method: Method, path: impl Into<String>) -> RouteBuilder<R, C> {
        RouteBuilder::new(route_type, method, path)
    }
}
