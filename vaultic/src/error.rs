//! Error taxonomy for the Vaultic SDK.
//!
//! Failed requests are classified into a specific [`ErrorKind`]: first by
//! matching the server's error code against a fixed table, then by HTTP
//! status, then falling back to a generic HTTP kind. The resulting
//! [`HttpError`] always carries the parsed error list plus the original
//! request and response so callers can inspect the raw exchange.

use std::fmt;

use http::StatusCode;
use serde::Deserialize;

use crate::codec::CodecError;
use crate::transport::{Request, Response};
use crate::value::ApiError;

/// Top-level error type for every SDK operation.
///
/// The core never retries: each failure surfaces exactly once, typed, so
/// callers can decide whether to refresh credentials, back off, or abort.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-2xx status, classified from its
    /// error body and HTTP status.
    #[error(transparent)]
    Http(Box<HttpError>),

    /// The transport failed before any response was received.
    #[error("transport error: {message}")]
    Transport {
        /// The request that could not be delivered.
        request: Box<Request>,
        /// The transport's failure description.
        message: String,
    },

    /// A cached OAuth access token expired before the request was sent.
    ///
    /// Raised client-side without any network call; refresh the token and
    /// retry.
    #[error("access token has expired")]
    TokenExpired,

    /// A successful response carried a body that is not valid JSON or not
    /// shaped as expected.
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] CodecError),

    /// Local misuse of the SDK, detected before any I/O.
    #[error("{0}")]
    Logic(String),
}

impl From<HttpError> for Error {
    fn from(error: HttpError) -> Self {
        Self::Http(Box::new(error))
    }
}

/// The specific category of an HTTP failure.
///
/// Code-derived kinds (from the error body) take precedence over
/// status-derived kinds; [`ErrorKind::Http`] is the unmatched fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required parameter was missing (`param_required`).
    ParamRequired,
    /// The request was malformed (`invalid_request`).
    InvalidRequest,
    /// The user must complete identity verification first
    /// (`personal_details_required`).
    PersonalDetailsRequired,
    /// The credentials were rejected (`authentication_error`).
    AuthenticationFailed,
    /// The account email is not yet verified (`unverified_email`).
    UnverifiedEmail,
    /// The access token is not recognized (`invalid_token`).
    InvalidToken,
    /// The access token has been revoked (`revoked_token`).
    RevokedToken,
    /// The access token has expired server-side (`expired_token`).
    ExpiredToken,
    /// HTTP 400 with no recognized error code.
    BadRequest,
    /// HTTP 401 with no recognized error code.
    Unauthorized,
    /// HTTP 402: the operation needs a two-factor token.
    TwoFactorRequired,
    /// HTTP 403 with no recognized error code.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 422: the request was understood but failed validation.
    Validation,
    /// HTTP 429: too many requests.
    RateLimited,
    /// HTTP 500.
    InternalServer,
    /// HTTP 503.
    ServiceUnavailable,
    /// Any other non-2xx response.
    Http,
}

impl ErrorKind {
    /// Looks up a server error code in the known-code table.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "param_required" => Some(Self::ParamRequired),
            "invalid_request" => Some(Self::InvalidRequest),
            "personal_details_required" => Some(Self::PersonalDetailsRequired),
            "authentication_error" => Some(Self::AuthenticationFailed),
            "unverified_email" => Some(Self::UnverifiedEmail),
            "invalid_token" => Some(Self::InvalidToken),
            "revoked_token" => Some(Self::RevokedToken),
            "expired_token" => Some(Self::ExpiredToken),
            _ => None,
        }
    }

    /// Classifies by HTTP status when no error code matched.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            402 => Self::TwoFactorRequired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            422 => Self::Validation,
            429 => Self::RateLimited,
            500 => Self::InternalServer,
            503 => Self::ServiceUnavailable,
            _ => Self::Http,
        }
    }
}

/// A classified non-2xx response.
///
/// Keeps the full exchange: every parsed error entry (possibly none), the
/// request as sent, and the response as received.
#[derive(Debug, Clone)]
pub struct HttpError {
    kind: ErrorKind,
    errors: Vec<ApiError>,
    request: Request,
    response: Response,
}

/// API error envelope: `{"errors": [{"id": ..., "message": ...}, ...]}`.
#[derive(Deserialize)]
struct ErrorsEnvelope {
    errors: Vec<ApiError>,
}

/// OAuth error envelope: `{"error": ..., "error_description": ...}`.
#[derive(Deserialize)]
struct OAuthErrorEnvelope {
    error: String,
    error_description: String,
}

/// Parses error entries out of a failure body.
///
/// An unparseable body yields no entries; classification then falls
/// through to the HTTP status.
fn parse_errors(body: &str) -> Vec<ApiError> {
    if let Ok(envelope) = serde_json::from_str::<ErrorsEnvelope>(body) {
        return envelope.errors;
    }
    if let Ok(envelope) = serde_json::from_str::<OAuthErrorEnvelope>(body) {
        return vec![ApiError::new(envelope.error, envelope.error_description)];
    }
    Vec::new()
}

impl HttpError {
    /// Classifies a non-2xx response into its [`ErrorKind`].
    #[must_use]
    pub fn classify(request: Request, response: Response) -> Self {
        let errors = parse_errors(&response.body);
        let kind = errors
            .first()
            .and_then(|error| ErrorKind::from_code(error.id()))
            .unwrap_or_else(|| ErrorKind::from_status(response.status));

        Self {
            kind,
            errors,
            request,
            response,
        }
    }

    /// The classified kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Every error entry the server sent; may be empty.
    #[must_use]
    pub fn errors(&self) -> &[ApiError] {
        &self.errors
    }

    /// The first error entry, when present.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.errors.first()
    }

    /// The request as sent.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response as received.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// The HTTP status of the failed response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "HTTP {}", self.response.status)
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            write!(f, "{}", messages.join(", "))
        }
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::json;
    use std::collections::HashSet;

    fn failed(status: u16, body: serde_json::Value) -> HttpError {
        let request = Request::new(Method::GET, "https://api.vaultic.com/accounts");
        let response = Response::new(
            StatusCode::from_u16(status).unwrap(),
            body.to_string(),
        );
        HttpError::classify(request, response)
    }

    #[test]
    fn test_every_known_code_maps_to_a_distinct_kind() {
        let codes = [
            "param_required",
            "invalid_request",
            "personal_details_required",
            "authentication_error",
            "unverified_email",
            "invalid_token",
            "revoked_token",
            "expired_token",
        ];
        let kinds: HashSet<ErrorKind> = codes
            .iter()
            .map(|code| ErrorKind::from_code(code).unwrap())
            .collect();
        assert_eq!(kinds.len(), codes.len());
    }

    #[test]
    fn test_code_takes_precedence_over_status() {
        let error = failed(
            401,
            json!({"errors": [{"id": "expired_token", "message": "Token expired"}]}),
        );
        assert_eq!(error.kind(), ErrorKind::ExpiredToken);
        assert_eq!(error.error().unwrap().message(), "Token expired");
    }

    #[test]
    fn test_unknown_code_falls_back_to_status() {
        let error = failed(
            404,
            json!({"errors": [{"id": "mystery_code", "message": "What is this"}]}),
        );
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.errors().len(), 1);
    }

    #[test]
    fn test_empty_error_list_classifies_by_status() {
        let error = failed(500, json!({"unrelated": true}));
        assert_eq!(error.kind(), ErrorKind::InternalServer);
        assert!(error.errors().is_empty());
    }

    #[test]
    fn test_oauth_envelope_yields_one_error() {
        let error = failed(
            401,
            json!({"error": "invalid_token", "error_description": "The access token is invalid"}),
        );
        assert_eq!(error.kind(), ErrorKind::InvalidToken);
        assert_eq!(error.error().unwrap().id(), "invalid_token");
    }

    #[test]
    fn test_unparseable_body_classifies_by_status() {
        let request = Request::new(Method::GET, "https://api.vaultic.com/accounts");
        let response = Response::new(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        let error = HttpError::classify(request, response);
        assert_eq!(error.kind(), ErrorKind::Http);
        assert!(error.errors().is_empty());
    }

    #[test]
    fn test_status_table_coverage() {
        let table = [
            (400, ErrorKind::BadRequest),
            (401, ErrorKind::Unauthorized),
            (402, ErrorKind::TwoFactorRequired),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::InternalServer),
            (503, ErrorKind::ServiceUnavailable),
        ];
        for (status, kind) in table {
            assert_eq!(
                ErrorKind::from_status(StatusCode::from_u16(status).unwrap()),
                kind
            );
        }
    }

    #[test]
    fn test_display_joins_error_messages() {
        let error = failed(
            400,
            json!({"errors": [
                {"id": "param_required", "message": "Missing amount"},
                {"id": "param_required", "message": "Missing currency"}
            ]}),
        );
        assert_eq!(error.to_string(), "Missing amount, Missing currency");
    }
}
