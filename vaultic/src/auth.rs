//! Authentication strategies for the request pipeline.
//!
//! Two strategies exist: [`ApiKeyAuthentication`] (HMAC-SHA256 request
//! signing) and [`OAuthAuthentication`] (bearer token with refresh/revoke).
//! The pipeline asks the active strategy for headers over the signing base
//! `(method, path, body)` just before each send.
//!
//! Strategies are not internally synchronized: a caller sharing one
//! instance across concurrent call sites must serialize refresh operations
//! itself, or a late refresh can overwrite a newer token pair.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::Error;
use crate::transport::{Request, Response, header_value};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key.
pub const ACCESS_KEY_HEADER: &str = "access-key";
/// Header carrying the lowercase hex HMAC-SHA256 signature.
pub const ACCESS_SIGNATURE_HEADER: &str = "access-signature";
/// Header carrying the microsecond timestamp the signature was drawn at.
pub const ACCESS_TIMESTAMP_HEADER: &str = "access-timestamp";

/// Polymorphic header and token-lifecycle logic.
///
/// `create_refresh_request` / `create_revoke_request` return `Ok(None)`
/// when the strategy has no such operation (API-key auth never refreshes).
pub trait Authentication {
    /// Authentication headers for a request about to be sent.
    ///
    /// `path` is the request target including any query string; `body` is
    /// the serialized body, empty for bodiless requests.
    ///
    /// # Errors
    ///
    /// [`Error::TokenExpired`] when a tracked token expiry has passed, or
    /// [`Error::Logic`] when a credential cannot be encoded as a header.
    fn request_headers(
        &self,
        method: &Method,
        path: &str,
        body: &str,
    ) -> Result<HeaderMap, Error>;

    /// Builds the token refresh request, or `Ok(None)` when this strategy
    /// does not refresh.
    ///
    /// # Errors
    ///
    /// [`Error::Logic`] when refresh is supported but no refresh token is
    /// held; this fails before any I/O.
    fn create_refresh_request(&self, _base_url: &str) -> Result<Option<Request>, Error> {
        Ok(None)
    }

    /// Applies a successful refresh response to the stored credentials.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedBody`](Error) when the token grant cannot be parsed.
    fn handle_refresh_response(
        &mut self,
        _request: &Request,
        _response: &Response,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Builds the token revoke request, or `Ok(None)` when this strategy
    /// does not revoke.
    ///
    /// # Errors
    ///
    /// [`Error::Logic`] when the revoke request cannot be constructed.
    fn create_revoke_request(&self, _base_url: &str) -> Result<Option<Request>, Error> {
        Ok(None)
    }

    /// Acknowledges a successful revoke response.
    ///
    /// Revocation is terminal: no state changes here, the caller discards
    /// the strategy.
    ///
    /// # Errors
    ///
    /// Implementations that inspect the response may fail to parse it.
    fn handle_revoke_response(
        &mut self,
        _request: &Request,
        _response: &Response,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// Source of signing timestamps, injectable for deterministic tests.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Microseconds since the Unix epoch.
    ///
    /// Implementations must never return the same value twice: the server
    /// rejects replayed timestamps, so two distinct requests signed with
    /// one timestamp is a correctness bug.
    fn timestamp_micros(&self) -> u64;
}

/// Wall-clock [`Clock`] with a strictly-increasing guarantee.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl Clock for SystemClock {
    fn timestamp_micros(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX));

        // Monotonic tie-breaker: stay strictly increasing even when the OS
        // clock has coarse resolution or steps backwards.
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }
}

/// HMAC-SHA256 request signing with an API key pair.
pub struct ApiKeyAuthentication {
    api_key: String,
    api_secret: String,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for ApiKeyAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthentication")
            .field("api_key", &self.api_key)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ApiKeyAuthentication {
    /// Creates a signing strategy using the system clock.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            clock: Box::new(SystemClock::default()),
        }
    }

    /// Replaces the clock; used by tests to pin timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The configured API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Computes the lowercase hex signature over the signing base
    /// `timestamp || method || path || body`.
    ///
    /// Pure in all its inputs: a fixed timestamp always yields the same
    /// signature.
    #[must_use]
    pub fn signature(&self, timestamp: u64, method: &Method, path: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(method.as_str().as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl Authentication for ApiKeyAuthentication {
    fn request_headers(
        &self,
        method: &Method,
        path: &str,
        body: &str,
    ) -> Result<HeaderMap, Error> {
        // A fresh timestamp per call; reuse would trip server-side replay
        // protection.
        let timestamp = self.clock.timestamp_micros();
        let signature = self.signature(timestamp, method, path, body);

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ACCESS_KEY_HEADER),
            header_value(&self.api_key)?,
        );
        headers.insert(
            HeaderName::from_static(ACCESS_SIGNATURE_HEADER),
            header_value(&signature)?,
        );
        headers.insert(
            HeaderName::from_static(ACCESS_TIMESTAMP_HEADER),
            header_value(&timestamp.to_string())?,
        );
        Ok(headers)
    }
}

/// Wire shape of a successful `POST /oauth/token` exchange.
#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth bearer authentication with refresh and revoke.
pub struct OAuthAuthentication {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for OAuthAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAuthentication")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl OAuthAuthentication {
    /// Creates a bearer strategy from an access token alone.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Adds the refresh token, enabling [`create_refresh_request`].
    ///
    /// [`create_refresh_request`]: Authentication::create_refresh_request
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Tracks the access token's expiry so doomed requests fail fast
    /// client-side instead of round-tripping to the server.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The current access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The current refresh token, if one is held.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// The tracked expiry, if one is known.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl Authentication for OAuthAuthentication {
    fn request_headers(
        &self,
        _method: &Method,
        _path: &str,
        _body: &str,
    ) -> Result<HeaderMap, Error> {
        if let Some(expires_at) = self.expires_at {
            if expires_at <= Utc::now() {
                return Err(Error::TokenExpired);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.access_token))?,
        );
        Ok(headers)
    }

    fn create_refresh_request(&self, base_url: &str) -> Result<Option<Request>, Error> {
        let Some(refresh_token) = &self.refresh_token else {
            return Err(Error::Logic("there is no refresh token".into()));
        };

        let body = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        });
        let request = Request::new(
            Method::POST,
            format!("{}/oauth/token", base_url.trim_end_matches('/')),
        )
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(body.to_string());
        Ok(Some(request))
    }

    fn handle_refresh_response(
        &mut self,
        _request: &Request,
        response: &Response,
    ) -> Result<(), Error> {
        let grant: TokenGrant = serde_json::from_str(&response.body)
            .map_err(crate::codec::CodecError::from)?;

        self.access_token = grant.access_token;
        if grant.refresh_token.is_some() {
            self.refresh_token = grant.refresh_token;
        }
        // An expires_in beyond chrono's range cannot be tracked; treat it
        // as an untracked expiry rather than failing the refresh.
        self.expires_at = grant.expires_in.and_then(|seconds| {
            TimeDelta::try_seconds(seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        });
        Ok(())
    }

    fn create_revoke_request(&self, base_url: &str) -> Result<Option<Request>, Error> {
        let body = serde_json::json!({ "token": self.access_token });
        let request = Request::new(
            Method::POST,
            format!("{}/oauth/revoke", base_url.trim_end_matches('/')),
        )
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .with_body(body.to_string());
        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    /// Clock pinned to a fixed microsecond value.
    #[derive(Debug)]
    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn timestamp_micros(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_signature_is_deterministic() {
        let auth = ApiKeyAuthentication::new("key", "secret");
        let first = auth.signature(1_700_000_000_000_000, &Method::GET, "/accounts", "");
        let second = auth.signature(1_700_000_000_000_000, &Method::GET, "/accounts", "");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signature_depends_on_every_base_component() {
        let auth = ApiKeyAuthentication::new("key", "secret");
        let base = auth.signature(1, &Method::GET, "/accounts", "");
        assert_ne!(base, auth.signature(2, &Method::GET, "/accounts", ""));
        assert_ne!(base, auth.signature(1, &Method::POST, "/accounts", ""));
        assert_ne!(base, auth.signature(1, &Method::GET, "/orders", ""));
        assert_ne!(base, auth.signature(1, &Method::GET, "/accounts", "{}"));
    }

    #[test]
    fn test_api_key_headers() {
        let auth = ApiKeyAuthentication::new("key", "secret").with_clock(FixedClock(42));
        let headers = auth.request_headers(&Method::GET, "/accounts", "").unwrap();
        assert_eq!(headers.get(ACCESS_KEY_HEADER).unwrap(), "key");
        assert_eq!(headers.get(ACCESS_TIMESTAMP_HEADER).unwrap(), "42");
        assert_eq!(
            headers.get(ACCESS_SIGNATURE_HEADER).unwrap(),
            auth.signature(42, &Method::GET, "/accounts", "").as_str()
        );
    }

    #[test]
    fn test_api_key_has_no_refresh_or_revoke() {
        let auth = ApiKeyAuthentication::new("key", "secret");
        assert!(auth.create_refresh_request("https://api.vaultic.com").unwrap().is_none());
        assert!(auth.create_revoke_request("https://api.vaultic.com").unwrap().is_none());
    }

    #[test]
    fn test_system_clock_is_strictly_increasing() {
        let clock = SystemClock::default();
        let mut last = 0;
        for _ in 0..1_000 {
            let next = clock.timestamp_micros();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_oauth_bearer_header() {
        let auth = OAuthAuthentication::new("token123");
        let headers = auth.request_headers(&Method::GET, "/user", "").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token123");
    }

    #[test]
    fn test_oauth_expired_token_fails_before_io() {
        let auth = OAuthAuthentication::new("token123")
            .with_expiry(Utc::now() - TimeDelta::seconds(1));
        let result = auth.request_headers(&Method::GET, "/user", "");
        assert!(matches!(result, Err(Error::TokenExpired)));
    }

    #[test]
    fn test_refresh_without_token_is_a_logic_error() {
        let auth = OAuthAuthentication::new("token123");
        let result = auth.create_refresh_request("https://api.vaultic.com");
        assert!(matches!(result, Err(Error::Logic(_))));
    }

    #[test]
    fn test_refresh_request_shape() {
        let auth = OAuthAuthentication::new("token123").with_refresh_token("refresh456");
        let request = auth
            .create_refresh_request("https://api.vaultic.com/")
            .unwrap()
            .unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://api.vaultic.com/oauth/token");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["grant_type"], "refresh_token");
        assert_eq!(body["refresh_token"], "refresh456");
    }

    #[test]
    fn test_refresh_response_replaces_tokens() {
        let mut auth = OAuthAuthentication::new("old").with_refresh_token("old_refresh");
        let request = auth
            .create_refresh_request("https://api.vaultic.com")
            .unwrap()
            .unwrap();
        let response = Response::new(
            StatusCode::OK,
            serde_json::json!({
                "access_token": "new",
                "refresh_token": "new_refresh",
                "expires_in": 7200
            })
            .to_string(),
        );
        auth.handle_refresh_response(&request, &response).unwrap();
        assert_eq!(auth.access_token(), "new");
        assert_eq!(auth.refresh_token(), Some("new_refresh"));
        assert!(auth.expires_at().unwrap() > Utc::now());
    }

    #[test]
    fn test_refresh_response_with_out_of_range_expiry_tracks_none() {
        let mut auth = OAuthAuthentication::new("old")
            .with_refresh_token("r")
            .with_expiry(Utc::now() + TimeDelta::seconds(60));
        let request = auth
            .create_refresh_request("https://api.vaultic.com")
            .unwrap()
            .unwrap();
        let response = Response::new(
            StatusCode::OK,
            serde_json::json!({"access_token": "new", "expires_in": i64::MAX}).to_string(),
        );
        auth.handle_refresh_response(&request, &response).unwrap();
        assert_eq!(auth.access_token(), "new");
        assert!(auth.expires_at().is_none());
    }

    #[test]
    fn test_refresh_response_rejects_malformed_grant() {
        let mut auth = OAuthAuthentication::new("old").with_refresh_token("r");
        let request = auth
            .create_refresh_request("https://api.vaultic.com")
            .unwrap()
            .unwrap();
        let response = Response::new(StatusCode::OK, "not json");
        let result = auth.handle_refresh_response(&request, &response);
        assert!(matches!(result, Err(Error::MalformedBody(_))));
        assert_eq!(auth.access_token(), "old");
    }

    #[test]
    fn test_revoke_request_carries_access_token() {
        let auth = OAuthAuthentication::new("token123");
        let request = auth
            .create_revoke_request("https://api.vaultic.com")
            .unwrap()
            .unwrap();
        assert_eq!(request.url, "https://api.vaultic.com/oauth/revoke");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["token"], "token123");
    }
}
