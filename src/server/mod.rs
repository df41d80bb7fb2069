//! # Server Module
//!
//! The request and response abstraction the pipeline works on, plus the thin
//! conversions transport adapters use to and from the `http` crate types.
//!
//! Connection handling, TLS and framing stay with the host server; an adapter
//! only converts:
//!
//! ```rust,ignore
//! let request = ApiRequest::from_http(native_request);
//! let response = api.process_request(request).await;
//! let native_response = response.into_http()?;
//! ```

mod request;
mod response;

pub use request::ApiRequest;
pub use response::ApiResponse;
