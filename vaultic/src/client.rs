//! The request pipeline: parameter placement, header assembly, signing,
//! dispatch, and response classification.

use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, USER_AGENT};
use http::{HeaderValue, Method};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::Authentication;
use crate::error::{Error, HttpError};
use crate::transport::{Request, Response, Transport, header_value};
use crate::value::ApiError;

/// Base URL requests are issued against unless configured otherwise.
pub const DEFAULT_API_URL: &str = "https://api.vaultic.com/v2";

/// API version date sent with every request unless configured otherwise.
pub const DEFAULT_API_VERSION: &str = "2025-01-01";

/// Header carrying the API version date.
pub const API_VERSION_HEADER: &str = "api-version";

/// Parameter holding a one-time two-factor code. It travels as a header,
/// never as a body or query parameter.
pub const TWO_FACTOR_PARAM: &str = "two_factor_token";

/// Header the two-factor code travels in.
pub const TWO_FACTOR_HEADER: &str = "2fa-token";

const CLIENT_USER_AGENT: &str = concat!("vaultic-rs/", env!("CARGO_PKG_VERSION"));

/// Request parameters, keyed by wire name.
pub type Params = serde_json::Map<String, Value>;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_url: String,
    api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Configuration against a non-default base URL, for sandboxes and
    /// tests.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Pins a specific API version date.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// The configured base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Synchronous API client over an injected transport and authentication
/// strategy.
pub struct HttpClient {
    config: ClientConfig,
    auth: Box<dyn Authentication>,
    transport: Box<dyn Transport>,
    last_request: Option<Request>,
    last_response: Option<Response>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Creates a client from its three collaborators.
    pub fn new(
        config: ClientConfig,
        auth: impl Authentication + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            config,
            auth: Box::new(auth),
            transport: Box::new(transport),
            last_request: None,
            last_response: None,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The most recent request sent, including failed ones.
    #[must_use]
    pub fn last_request(&self) -> Option<&Request> {
        self.last_request.as_ref()
    }

    /// The most recent response received.
    #[must_use]
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Issues a GET; parameters travel as the query string.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from building, signing, sending, or classifying the
    /// exchange.
    pub fn get(&mut self, path: &str, params: &Params) -> Result<Response, Error> {
        self.request(Method::GET, path, params)
    }

    /// Issues a POST; parameters travel as a JSON body.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from building, signing, sending, or classifying the
    /// exchange.
    pub fn post(&mut self, path: &str, params: &Params) -> Result<Response, Error> {
        self.request(Method::POST, path, params)
    }

    /// Issues a PUT; parameters travel as a JSON body.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from building, signing, sending, or classifying the
    /// exchange.
    pub fn put(&mut self, path: &str, params: &Params) -> Result<Response, Error> {
        self.request(Method::PUT, path, params)
    }

    /// Issues a DELETE; parameters travel as the query string.
    ///
    /// # Errors
    ///
    /// Any [`Error`] from building, signing, sending, or classifying the
    /// exchange.
    pub fn delete(&mut self, path: &str, params: &Params) -> Result<Response, Error> {
        self.request(Method::DELETE, path, params)
    }

    /// Refreshes the active authentication through its own endpoint and
    /// applies the new credentials.
    ///
    /// # Errors
    ///
    /// [`Error::Logic`] when the active strategy does not refresh, plus
    /// any exchange error.
    pub fn refresh_authentication(&mut self) -> Result<(), Error> {
        let Some(request) = self.auth.create_refresh_request(&self.config.api_url)? else {
            return Err(Error::Logic(
                "the active authentication does not support refresh".into(),
            ));
        };
        let response = self.send(request.clone())?;
        self.auth.handle_refresh_response(&request, &response)
    }

    /// Revokes the active authentication's credentials server-side.
    ///
    /// # Errors
    ///
    /// [`Error::Logic`] when the active strategy does not revoke, plus
    /// any exchange error.
    pub fn revoke_authentication(&mut self) -> Result<(), Error> {
        let Some(request) = self.auth.create_revoke_request(&self.config.api_url)? else {
            return Err(Error::Logic(
                "the active authentication does not support revoke".into(),
            ));
        };
        let response = self.send(request.clone())?;
        self.auth.handle_revoke_response(&request, &response)
    }

    fn request(&mut self, method: Method, path: &str, params: &Params) -> Result<Response, Error> {
        let mut params = params.clone();
        let two_factor_token = params
            .remove(TWO_FACTOR_PARAM)
            .and_then(|value| value.as_str().map(str::to_owned));

        // GET and DELETE carry parameters in the query string; writes
        // carry them as a JSON body. The signing base sees exactly what
        // the server will: the path with its query, and the body bytes.
        let (target, body) = if method == Method::GET || method == Method::DELETE {
            (append_query(path, &params), String::new())
        } else if params.is_empty() {
            (path.to_owned(), String::new())
        } else {
            (path.to_owned(), Value::Object(params).to_string())
        };

        let auth_headers = self.auth.request_headers(&method, &target, &body)?;

        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), target);
        let mut request = Request::new(method, url).with_body(body);
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        request
            .headers
            .insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        request.headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            header_value(&self.config.api_version)?,
        );
        if let Some(token) = two_factor_token {
            request.headers.insert(
                HeaderName::from_static(TWO_FACTOR_HEADER),
                header_value(&token)?,
            );
        }
        // Auth headers go last so no default can shadow them.
        for (name, value) in &auth_headers {
            request.headers.insert(name, value.clone());
        }

        self.send(request)
    }

    fn send(&mut self, request: Request) -> Result<Response, Error> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let result = self.transport.send(&request);
        self.last_request = Some(request.clone());

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                return Err(Error::Transport {
                    request: Box::new(request),
                    message: error.message().to_owned(),
                });
            }
        };
        self.last_response = Some(response.clone());
        log_warnings(&response);

        if response.is_success() {
            Ok(response)
        } else {
            tracing::debug!(status = %response.status, "request failed");
            Err(HttpError::classify(request, response).into())
        }
    }
}

#[derive(Deserialize)]
struct WarningsEnvelope {
    #[serde(default)]
    warnings: Vec<ApiError>,
}

/// Surfaces server-side deprecation warnings without touching the
/// response itself.
fn log_warnings(response: &Response) {
    let Ok(envelope) = serde_json::from_str::<WarningsEnvelope>(&response.body) else {
        return;
    };
    for warning in &envelope.warnings {
        tracing::warn!(
            id = warning.id(),
            message = warning.message(),
            url = warning.url().unwrap_or(""),
            "api warning"
        );
    }
}

/// Appends parameters to a path as a query string. Non-string values are
/// serialized as their JSON text.
fn append_query(path: &str, params: &Params) -> String {
    if params.is_empty() {
        return path.to_owned();
    }
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::String(text) => serializer.append_pair(key, text),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        ACCESS_SIGNATURE_HEADER, ApiKeyAuthentication, Clock, OAuthAuthentication,
    };
    use crate::error::ErrorKind;
    use crate::transport::TransportError;
    use http::StatusCode;
    use http::header::AUTHORIZATION;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn timestamp_micros(&self) -> u64 {
            self.0
        }
    }

    #[derive(Clone, Default)]
    struct MockTransport {
        requests: Arc<Mutex<Vec<Request>>>,
        responses: Arc<Mutex<VecDeque<Response>>>,
    }

    impl MockTransport {
        fn queue(&self, response: Response) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn queue_ok(&self, body: &str) {
            self.queue(Response::new(StatusCode::OK, body));
        }

        fn sent(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        fn send(&self, request: &Request) -> Result<Response, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::new("no queued response"))
        }
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn api_key_client(transport: &MockTransport) -> HttpClient {
        HttpClient::new(
            ClientConfig::new("https://api.test/v2"),
            ApiKeyAuthentication::new("key", "secret").with_clock(FixedClock(42)),
            transport.clone(),
        )
    }

    #[test]
    fn test_get_puts_params_in_query_string() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client
            .get("/accounts", &params(json!({"limit": 25, "order": "desc"})))
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].url, "https://api.test/v2/accounts?limit=25&order=desc");
        assert!(sent[0].body.is_empty());
    }

    #[test]
    fn test_post_puts_params_in_json_body() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client
            .post("/accounts/A1/transactions", &params(json!({"type": "send", "to": "addr"})))
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].url, "https://api.test/v2/accounts/A1/transactions");
        let body: Value = serde_json::from_str(&sent[0].body).unwrap();
        assert_eq!(body, json!({"type": "send", "to": "addr"}));
        assert_eq!(sent[0].headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_signature_covers_path_with_query() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client.get("/accounts", &params(json!({"limit": 5}))).unwrap();

        let auth = ApiKeyAuthentication::new("key", "secret");
        let expected = auth.signature(42, &Method::GET, "/accounts?limit=5", "");
        let sent = transport.sent();
        assert_eq!(
            sent[0].headers.get(ACCESS_SIGNATURE_HEADER).unwrap(),
            expected.as_str()
        );
    }

    #[test]
    fn test_two_factor_token_moves_to_header_and_skips_signing() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client
            .post(
                "/accounts/A1/transactions",
                &params(json!({"type": "send", "two_factor_token": "123456"})),
            )
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].headers.get(TWO_FACTOR_HEADER).unwrap(), "123456");
        let body: Value = serde_json::from_str(&sent[0].body).unwrap();
        assert_eq!(body, json!({"type": "send"}));

        // The signature is computed as if the token were never passed.
        let auth = ApiKeyAuthentication::new("key", "secret");
        let expected = auth.signature(
            42,
            &Method::POST,
            "/accounts/A1/transactions",
            &json!({"type": "send"}).to_string(),
        );
        assert_eq!(
            sent[0].headers.get(ACCESS_SIGNATURE_HEADER).unwrap(),
            expected.as_str()
        );
    }

    #[test]
    fn test_default_headers_are_present() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client.get("/user", &Params::new()).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].headers.get(API_VERSION_HEADER).unwrap(), DEFAULT_API_VERSION);
        assert_eq!(sent[0].headers.get(USER_AGENT).unwrap(), CLIENT_USER_AGENT);
    }

    #[test]
    fn test_auth_headers_win_over_defaults() {
        struct ShadowingAuth;

        impl Authentication for ShadowingAuth {
            fn request_headers(
                &self,
                _method: &Method,
                _path: &str,
                _body: &str,
            ) -> Result<http::HeaderMap, Error> {
                let mut headers = http::HeaderMap::new();
                headers.insert(
                    HeaderName::from_static(API_VERSION_HEADER),
                    HeaderValue::from_static("from-auth"),
                );
                Ok(headers)
            }
        }

        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = HttpClient::new(
            ClientConfig::new("https://api.test/v2"),
            ShadowingAuth,
            transport.clone(),
        );

        client.get("/user", &Params::new()).unwrap();
        let sent = transport.sent();
        assert_eq!(sent[0].headers.get(API_VERSION_HEADER).unwrap(), "from-auth");
    }

    #[test]
    fn test_last_exchange_is_retained() {
        let transport = MockTransport::default();
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = api_key_client(&transport);

        client.get("/user", &Params::new()).unwrap();

        assert_eq!(
            client.last_request().unwrap().url,
            "https://api.test/v2/user"
        );
        assert_eq!(client.last_response().unwrap().status, StatusCode::OK);
    }

    #[test]
    fn test_failed_request_is_still_retained() {
        let transport = MockTransport::default();
        transport.queue(Response::new(
            StatusCode::NOT_FOUND,
            json!({"errors": [{"id": "not_found", "message": "missing"}]}).to_string(),
        ));
        let mut client = api_key_client(&transport);

        let error = client.get("/accounts/nope", &Params::new()).unwrap_err();
        assert!(matches!(&error, Error::Http(http) if http.kind() == ErrorKind::NotFound));
        assert_eq!(client.last_response().unwrap().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_transport_failure_carries_the_request() {
        let transport = MockTransport::default();
        let mut client = api_key_client(&transport);

        let error = client.get("/user", &Params::new()).unwrap_err();
        assert!(
            matches!(&error, Error::Transport { request, message }
                if request.url == "https://api.test/v2/user" && message == "no queued response")
        );
    }

    #[test]
    fn test_refresh_updates_the_bearer_token() {
        let transport = MockTransport::default();
        transport.queue_ok(
            &json!({"access_token": "new", "refresh_token": "r2", "expires_in": 7200}).to_string(),
        );
        transport.queue_ok(r#"{"data": {}}"#);
        let mut client = HttpClient::new(
            ClientConfig::new("https://api.test/v2"),
            OAuthAuthentication::new("old").with_refresh_token("r1"),
            transport.clone(),
        );

        client.refresh_authentication().unwrap();
        client.get("/user", &Params::new()).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].url, "https://api.test/v2/oauth/token");
        assert_eq!(sent[1].headers.get(AUTHORIZATION).unwrap(), "Bearer new");
    }

    #[test]
    fn test_refresh_with_api_key_auth_is_a_logic_error() {
        let transport = MockTransport::default();
        let mut client = api_key_client(&transport);
        let result = client.refresh_authentication();
        assert!(matches!(result, Err(Error::Logic(_))));
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_revoke_sends_the_access_token() {
        let transport = MockTransport::default();
        transport.queue(Response::new(StatusCode::OK, ""));
        let mut client = HttpClient::new(
            ClientConfig::new("https://api.test/v2"),
            OAuthAuthentication::new("token123"),
            transport.clone(),
        );

        client.revoke_authentication().unwrap();
        let sent = transport.sent();
        assert_eq!(sent[0].url, "https://api.test/v2/oauth/revoke");
        let body: Value = serde_json::from_str(&sent[0].body).unwrap();
        assert_eq!(body["token"], "token123");
    }
}
