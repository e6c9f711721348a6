//! Client-side core for the Vaultic REST API.
//!
//! The crate is transport-agnostic: [`HttpClient`] drives any
//! [`Transport`] implementation, signing or bearer-authenticating each
//! request through an injected [`Authentication`] strategy, and the
//! [`Mapper`] turns wire envelopes into typed resources and back.
//!
//! - [`auth`]: API-key HMAC signing and OAuth bearer strategies
//! - [`client`]: the request pipeline
//! - [`codec`]: wire JSON to typed resources and back
//! - [`collection`]: paged listings and cursor merging
//! - [`error`]: the error taxonomy and HTTP failure classification
//! - [`resource`]: the typed resource model
//! - [`transport`]: the boundary a concrete HTTP stack plugs into
//! - [`value`]: money, fees, and other wire value types
//!
//! ```
//! use vaultic::{
//!     ApiKeyAuthentication, ClientConfig, HttpClient, Mapper, Params,
//!     Request, Response, Transport, TransportError,
//! };
//! use vaultic::resource::Account;
//!
//! struct CannedTransport;
//!
//! impl Transport for CannedTransport {
//!     fn send(&self, _request: &Request) -> Result<Response, TransportError> {
//!         Ok(Response::new(
//!             http::StatusCode::OK,
//!             r#"{"data": {"id": "A1", "resource": "account", "name": "Primary"}}"#,
//!         ))
//!     }
//! }
//!
//! # fn main() -> Result<(), vaultic::Error> {
//! let mut client = HttpClient::new(
//!     ClientConfig::default(),
//!     ApiKeyAuthentication::new("key", "secret"),
//!     CannedTransport,
//! );
//! let response = client.get("/accounts/A1", &Params::new())?;
//! let account: Account = Mapper::new().to_resource(&response.body)?;
//! assert_eq!(account.name.as_deref(), Some("Primary"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod codec;
pub mod collection;
pub mod error;
pub mod resource;
pub mod transport;
pub mod value;

pub use auth::{ApiKeyAuthentication, Authentication, OAuthAuthentication};
pub use client::{ClientConfig, HttpClient, Params};
pub use codec::{CodecError, Mapper, ResourceRegistry};
pub use collection::{PaginationError, ResourceCollection};
pub use error::{Error, ErrorKind, HttpError};
pub use transport::{Request, Response, Transport, TransportError};
pub use value::{ApiError, Fee, Money, NetworkStatus};
