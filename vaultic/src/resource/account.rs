//! Accounts: single-currency wallets owned by the authenticated user.

use chrono::{DateTime, Utc};

use crate::codec::{FieldDef, FieldValue};
use crate::resource::{MappedResource, ResourceBase, ResourceKind, impl_resource};
use crate::value::Money;

/// A wallet holding a balance in one currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub(crate) base: ResourceBase,
    /// User-visible account name.
    pub name: Option<String>,
    /// Whether this is the user's primary account.
    pub primary: Option<bool>,
    /// Account flavor, such as `wallet` or `vault`.
    pub account_type: Option<String>,
    /// Currency code the account is denominated in.
    pub currency: Option<String>,
    /// Balance in the account's own currency.
    pub balance: Option<Money>,
    /// Balance converted to the user's native currency.
    pub native_balance: Option<Money>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// An unexpanded reference to the account with the given id.
    #[must_use]
    pub fn reference(id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!("/accounts/{}", id.as_ref())),
            ..Self::default()
        }
    }
}

impl_resource!(Account);

static FIELDS: &[FieldDef<Account>] = &[
    FieldDef {
        wire_key: "name",
        set: |resource, value| resource.name = value.into_string(),
        get: |resource| resource.name.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "primary",
        set: |resource, value| resource.primary = value.into_bool(),
        get: |resource| resource.primary.map(FieldValue::bool),
    },
    FieldDef {
        wire_key: "type",
        set: |resource, value| resource.account_type = value.into_string(),
        get: |resource| resource.account_type.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "currency",
        set: |resource, value| resource.currency = value.into_string(),
        get: |resource| resource.currency.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "balance",
        set: |resource, value| resource.balance = value.into_money(),
        get: |resource| resource.balance.clone().map(FieldValue::Money),
    },
    FieldDef {
        wire_key: "native_balance",
        set: |resource, value| resource.native_balance = value.into_money(),
        get: |resource| resource.native_balance.clone().map(FieldValue::Money),
    },
    FieldDef {
        wire_key: "created_at",
        set: |resource, value| resource.created_at = value.into_timestamp(),
        get: |resource| resource.created_at.map(FieldValue::Timestamp),
    },
    FieldDef {
        wire_key: "updated_at",
        set: |resource, value| resource.updated_at = value.into_timestamp(),
        get: |resource| resource.updated_at.map(FieldValue::Timestamp),
    },
];

impl MappedResource for Account {
    const KIND: ResourceKind = ResourceKind::Account;

    fn fields() -> &'static [FieldDef<Self>] {
        FIELDS
    }

    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }
}
