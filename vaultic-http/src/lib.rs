//! A blocking [`reqwest`] transport for the Vaultic client core.
//!
//! ```no_run
//! use vaultic::{ApiKeyAuthentication, ClientConfig, HttpClient};
//! use vaultic_http::ReqwestTransport;
//!
//! let client = HttpClient::new(
//!     ClientConfig::default(),
//!     ApiKeyAuthentication::new("key", "secret"),
//!     ReqwestTransport::new(),
//! );
//! ```

use std::time::Duration;

use vaultic::{Request, Response, Transport, TransportError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Transport`] backed by a blocking [`reqwest::blocking::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// A transport with a 30 second timeout and bounded redirects.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// A transport over a caller-configured client.
    #[must_use]
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// A transport with a non-default request timeout.
    ///
    /// # Errors
    ///
    /// [`TransportError`] when the underlying client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|error| TransportError::new(error.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let raw = builder
            .send()
            .map_err(|error| TransportError::new(error.to_string()))?;

        let status = raw.status();
        let headers = raw.headers().clone();
        let body = raw
            .text()
            .map_err(|error| TransportError::new(error.to_string()))?;

        let mut response = Response::new(status, body);
        response.headers = headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transport_builds() {
        let transport = ReqwestTransport::new();
        let cloned = transport.clone();
        drop(cloned);
    }

    #[test]
    fn test_custom_timeout_builds() {
        assert!(ReqwestTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
