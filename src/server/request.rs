use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A transport-neutral inbound request.
///
/// Transport adapters build one of these from their native request type (see
/// [`ApiRequest::from_http`]). Header names are stored lower-cased.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    path: String,
    query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Create a request from a method and a URL.
    ///
    /// `url` may be absolute (`http://host/api/pets?limit=1`) or just the
    /// path and query (`/api/pets?limit=1`).
    pub fn new(method: Method, url: &str) -> Self {
        let (path, query) = split_url(url);
        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON body and the matching content type.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string().into_bytes())
    }

    /// Convert an `http` request. Headers that are not valid UTF-8 are skipped.
    pub fn from_http(req: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = req.into_parts();
        let mut request = ApiRequest::new(parts.method, &parts.uri.to_string());
        for (name, value) in &parts.headers {
            if let Ok(value) = value.to_str() {
                request.headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        if !body.is_empty() {
            request.body = Some(body);
        }
        request
    }

    /// Request path without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, without the leading `?`.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// URL-decoded query parameters.
    ///
    /// A parameter seen once maps to a string; a repeated parameter maps to
    /// an array of strings in arrival order.
    #[must_use]
    pub fn query_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        let Some(query) = &self.query else {
            return params;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Value::String(value.into_owned());
            match params.get_mut(key.as_ref()) {
                None => {
                    params.insert(key.into_owned(), value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        params
    }

    /// Decoded JSON body. A missing or unparsable body is an empty object.
    #[must_use]
    pub fn json_body(&self) -> Value {
        self.body
            .as_deref()
            .filter(|b| !b.is_empty())
            .and_then(|b| serde_json::from_slice(b).ok())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

fn split_url(url: &str) -> (String, Option<String>) {
    if url.contains("://") {
        if let Ok(parsed) = url::Url::parse(url) {
            return (parsed.path().to_string(), parsed.query().map(str::to_string));
        }
    }
    let without_fragment = url.split('#').next().unwrap_or(url);
    match without_fragment.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (without_fragment.to_string(), None),
    }
}
