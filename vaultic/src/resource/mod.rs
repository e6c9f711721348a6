//! API resource types and the traits the codec maps them through.
//!
//! Every concrete resource embeds a [`ResourceBase`] carrying the wire
//! identity triple (`id`, `resource`, `resource_path`) plus the raw
//! decoded object. [`MappedResource`] exposes the static field table the
//! codec walks in both directions.

mod account;
mod address;
mod order;
mod payment_method;
mod transaction;
mod user;

pub use account::Account;
pub use address::Address;
pub use order::Order;
pub use payment_method::PaymentMethod;
pub use transaction::Transaction;
pub use user::User;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::FieldDef;

/// A decoded JSON object, as the wire delivers it.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// The `resource` discriminator tag carried by every API object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ResourceKind {
    /// A wallet holding a single currency.
    Account,
    /// A receive address under an account.
    Address,
    /// A ledger entry under an account.
    Transaction,
    /// A buy or sell order.
    Order,
    /// The authenticated user or a transaction counterparty.
    User,
    /// A linked funding source.
    PaymentMethod,
}

impl ResourceKind {
    /// The wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Address => "address",
            Self::Transaction => "transaction",
            Self::Order => "order",
            Self::User => "user",
            Self::PaymentMethod => "payment_method",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and raw-data state shared by every resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBase {
    id: Option<String>,
    resource_path: Option<String>,
    raw: Option<JsonObject>,
}

impl ResourceBase {
    /// Builds a base from a resource path, deriving the id from the final
    /// path segment.
    #[must_use]
    pub fn from_path(resource_path: impl Into<String>) -> Self {
        let resource_path = resource_path.into();
        let id = resource_path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned);
        Self {
            id,
            resource_path: Some(resource_path),
            raw: None,
        }
    }

    /// The server-assigned identifier, once known.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The canonical API path for this resource, once known.
    #[must_use]
    pub fn resource_path(&self) -> Option<&str> {
        self.resource_path.as_deref()
    }

    /// The raw decoded object this resource was populated from.
    #[must_use]
    pub fn raw(&self) -> Option<&JsonObject> {
        self.raw.as_ref()
    }

    /// Sets the id unless one is already present; a resource's identity
    /// never changes after assignment.
    pub fn set_id_if_unset(&mut self, id: impl Into<String>) {
        if self.id.is_none() {
            self.id = Some(id.into());
        }
    }

    /// Sets the resource path, deriving the id from its final segment when
    /// no id is held yet.
    pub fn set_resource_path(&mut self, resource_path: impl Into<String>) {
        let resource_path = resource_path.into();
        if self.id.is_none() {
            self.id = resource_path
                .rsplit('/')
                .next()
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned);
        }
        self.resource_path = Some(resource_path);
    }

    /// Replaces the raw decoded object.
    pub fn set_raw(&mut self, raw: JsonObject) {
        self.raw = Some(raw);
    }

    /// Whether the resource holds full data rather than just a reference.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.raw.is_some()
    }
}

/// Common behavior over all resource types.
pub trait Resource {
    /// The discriminator tag for this resource.
    fn kind(&self) -> ResourceKind;

    /// The server-assigned identifier, once known.
    fn id(&self) -> Option<&str>;

    /// The canonical API path, once known.
    fn resource_path(&self) -> Option<&str>;

    /// The raw decoded object, when the resource was populated from wire
    /// data.
    fn raw_data(&self) -> Option<&JsonObject>;

    /// Whether the resource holds full data rather than just a reference.
    fn is_expanded(&self) -> bool {
        self.raw_data().is_some()
    }

    /// The identity triple alone, as the wire encodes an unexpanded
    /// nested resource.
    fn resource_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id().map(str::to_owned),
            kind: self.kind(),
            resource_path: self.resource_path().map(str::to_owned),
        }
    }
}

/// The identity triple of a resource, detached from its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Server-assigned identifier.
    pub id: Option<String>,
    /// Discriminator tag.
    pub kind: ResourceKind,
    /// Canonical API path.
    pub resource_path: Option<String>,
}

/// A resource the codec can decode into and encode from via a static
/// field table.
pub trait MappedResource: Resource + Default + 'static {
    /// The discriminator tag for this type.
    const KIND: ResourceKind;

    /// The wire fields this type maps, in declaration order.
    fn fields() -> &'static [FieldDef<Self>];

    /// Shared identity state.
    fn base(&self) -> &ResourceBase;

    /// Shared identity state, mutably.
    fn base_mut(&mut self) -> &mut ResourceBase;
}

/// Implements [`Resource`] for a type with a `base: ResourceBase` field
/// and a `KIND` constant on its [`MappedResource`] impl.
macro_rules! impl_resource {
    ($type:ty) => {
        impl crate::resource::Resource for $type {
            fn kind(&self) -> crate::resource::ResourceKind {
                <Self as crate::resource::MappedResource>::KIND
            }

            fn id(&self) -> Option<&str> {
                self.base.id()
            }

            fn resource_path(&self) -> Option<&str> {
                self.base.resource_path()
            }

            fn raw_data(&self) -> Option<&crate::resource::JsonObject> {
                self.base.raw()
            }
        }
    };
}

pub(crate) use impl_resource;

/// A decoded resource of any kind.
///
/// Nested resource fields hold this enum so a transaction's counterparty
/// can be an account, a user, or anything else the server expands there.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnyResource {
    /// An account.
    Account(Box<Account>),
    /// A receive address.
    Address(Box<Address>),
    /// A transaction.
    Transaction(Box<Transaction>),
    /// An order.
    Order(Box<Order>),
    /// A user.
    User(Box<User>),
    /// A payment method.
    PaymentMethod(Box<PaymentMethod>),
}

impl AnyResource {
    /// The wrapped resource behind the common trait.
    #[must_use]
    pub fn inner(&self) -> &dyn Resource {
        match self {
            Self::Account(resource) => resource.as_ref(),
            Self::Address(resource) => resource.as_ref(),
            Self::Transaction(resource) => resource.as_ref(),
            Self::Order(resource) => resource.as_ref(),
            Self::User(resource) => resource.as_ref(),
            Self::PaymentMethod(resource) => resource.as_ref(),
        }
    }

    /// The wrapped account, if this is one.
    #[must_use]
    pub fn as_account(&self) -> Option<&Account> {
        match self {
            Self::Account(resource) => Some(resource),
            _ => None,
        }
    }

    /// The wrapped address, if this is one.
    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(resource) => Some(resource),
            _ => None,
        }
    }

    /// The wrapped transaction, if this is one.
    #[must_use]
    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(resource) => Some(resource),
            _ => None,
        }
    }

    /// The wrapped order, if this is one.
    #[must_use]
    pub fn as_order(&self) -> Option<&Order> {
        match self {
            Self::Order(resource) => Some(resource),
            _ => None,
        }
    }

    /// The wrapped user, if this is one.
    #[must_use]
    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(resource) => Some(resource),
            _ => None,
        }
    }

    /// The wrapped payment method, if this is one.
    #[must_use]
    pub fn as_payment_method(&self) -> Option<&PaymentMethod> {
        match self {
            Self::PaymentMethod(resource) => Some(resource),
            _ => None,
        }
    }
}

impl From<Account> for AnyResource {
    fn from(resource: Account) -> Self {
        Self::Account(Box::new(resource))
    }
}

impl From<Address> for AnyResource {
    fn from(resource: Address) -> Self {
        Self::Address(Box::new(resource))
    }
}

impl From<Transaction> for AnyResource {
    fn from(resource: Transaction) -> Self {
        Self::Transaction(Box::new(resource))
    }
}

impl From<Order> for AnyResource {
    fn from(resource: Order) -> Self {
        Self::Order(Box::new(resource))
    }
}

impl From<User> for AnyResource {
    fn from(resource: User) -> Self {
        Self::User(Box::new(resource))
    }
}

impl From<PaymentMethod> for AnyResource {
    fn from(resource: PaymentMethod) -> Self {
        Self::PaymentMethod(Box::new(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_tags() {
        assert_eq!(ResourceKind::Account.as_str(), "account");
        assert_eq!(ResourceKind::PaymentMethod.as_str(), "payment_method");
        let tag: ResourceKind = serde_json::from_value(serde_json::json!("payment_method")).unwrap();
        assert_eq!(tag, ResourceKind::PaymentMethod);
    }

    #[test]
    fn test_base_from_path_derives_id() {
        let base = ResourceBase::from_path("/accounts/abc123");
        assert_eq!(base.id(), Some("abc123"));
        assert_eq!(base.resource_path(), Some("/accounts/abc123"));
        assert!(!base.is_expanded());
    }

    #[test]
    fn test_id_is_immutable_once_set() {
        let mut base = ResourceBase::default();
        base.set_id_if_unset("first");
        base.set_id_if_unset("second");
        assert_eq!(base.id(), Some("first"));
        base.set_resource_path("/accounts/third");
        assert_eq!(base.id(), Some("first"));
    }

    #[test]
    fn test_set_resource_path_derives_id_when_unset() {
        let mut base = ResourceBase::default();
        base.set_resource_path("/orders/ord1");
        assert_eq!(base.id(), Some("ord1"));
    }

    #[test]
    fn test_any_resource_delegates_identity() {
        let account = Account::reference("acct1");
        let any = AnyResource::from(account);
        assert_eq!(any.inner().kind(), ResourceKind::Account);
        assert_eq!(any.inner().id(), Some("acct1"));
        assert!(!any.inner().is_expanded());
        assert!(any.as_account().is_some());
        assert!(any.as_user().is_none());
    }
}
