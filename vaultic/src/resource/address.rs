//! Receive addresses scoped to an account.

use chrono::{DateTime, Utc};

use crate::codec::{FieldDef, FieldValue};
use crate::resource::{MappedResource, ResourceBase, ResourceKind, impl_resource};

/// An address that can receive funds into its account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub(crate) base: ResourceBase,
    /// The on-network address string.
    pub address: Option<String>,
    /// Optional user label.
    pub name: Option<String>,
    /// URL notified when the address receives funds.
    pub callback_url: Option<String>,
    /// Network the address lives on; a plain string here, unlike the
    /// settlement status on transactions.
    pub network: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Address {
    /// An unexpanded reference to an address under an account.
    #[must_use]
    pub fn reference(account_id: impl AsRef<str>, id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!(
                "/accounts/{}/addresses/{}",
                account_id.as_ref(),
                id.as_ref()
            )),
            ..Self::default()
        }
    }
}

impl_resource!(Address);

static FIELDS: &[FieldDef<Address>] = &[
    FieldDef {
        wire_key: "address",
        set: |resource, value| resource.address = value.into_string(),
        get: |resource| resource.address.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "name",
        set: |resource, value| resource.name = value.into_string(),
        get: |resource| resource.name.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "callback_url",
        set: |resource, value| resource.callback_url = value.into_string(),
        get: |resource| resource.callback_url.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "network",
        set: |resource, value| resource.network = value.into_string(),
        get: |resource| resource.network.clone().map(FieldValue::string),
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

impl MappedResource for Address {
    const KIND: ResourceKind = ResourceKind::Address;

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
