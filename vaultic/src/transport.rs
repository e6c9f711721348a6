//! Transport abstraction for the request pipeline.
//!
//! The core never talks to the network itself. It builds a [`Request`],
//! hands it to an injected [`Transport`], and interprets the [`Response`].
//! A blocking reqwest implementation lives in the `vaultic-http` crate;
//! tests inject their own.

use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::error::Error;

/// An outbound HTTP request, fully assembled and signed.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, including any query string.
    pub url: String,
    /// All headers, authentication included.
    pub headers: HeaderMap,
    /// Request body; empty for bodiless requests.
    pub body: String,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// An inbound HTTP response, body already read to completion.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body as text.
    pub body: String,
}

impl Response {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Failure to deliver a request or read its response.
///
/// This covers connection, TLS, and timeout failures — anything where no
/// HTTP status was received. Server-side failures arrive as a [`Response`]
/// and are classified by the error taxonomy instead.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Creates a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A synchronous HTTP send primitive.
///
/// Implementations block until the server responds or the attempt fails.
/// Timeouts, pooling, and TLS configuration belong to the implementation,
/// not to the core.
pub trait Transport: Send + Sync {
    /// Sends the request and returns the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received at all.
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

/// Builds a [`HeaderValue`] from runtime data, rejecting values that cannot
/// legally appear in an HTTP header.
pub(crate) fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::Logic("value contains characters not valid in an HTTP header".into()))
}
