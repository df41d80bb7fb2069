use http::header::CONTENT_TYPE;
use serde_json::Value;
use std::collections::BTreeMap;

/// The pipeline's result: always a status, a JSON body and string headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Convert into an `http` response with a JSON body.
    ///
    /// `content-type` defaults to `application/json` unless the handler set one.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range status or a header that is not a valid header
    /// name or value.
    pub fn into_http(self) -> Result<http::Response<Vec<u8>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        let has_content_type = self
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !has_content_type {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(self.body.to_string().into_bytes())
    }
}
