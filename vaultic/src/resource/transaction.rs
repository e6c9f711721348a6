//! Transactions: ledger entries under an account.
//!
//! The `to` and `from` counterparties are polymorphic: the server may
//! expand them into a user, an account, or any other resource, or leave
//! them as bare references.

use chrono::{DateTime, Utc};

use crate::codec::{Decoded, FieldDef, FieldValue};
use crate::resource::{
    AnyResource, MappedResource, ResourceBase, ResourceKind, impl_resource,
};
use crate::value::{Fee, Money, NetworkStatus};

/// A single ledger entry: a send, a request, a buy, a sell, or a transfer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    pub(crate) base: ResourceBase,
    /// Entry flavor, such as `send` or `buy`.
    pub transaction_type: Option<String>,
    /// Lifecycle status, such as `pending` or `completed`.
    pub status: Option<String>,
    /// Signed amount in the account's currency.
    pub amount: Option<Money>,
    /// Signed amount in the user's native currency.
    pub native_amount: Option<Money>,
    /// User-supplied note.
    pub description: Option<String>,
    /// Whether the entry settled through instant exchange.
    pub instant_exchange: Option<bool>,
    /// Fees charged against this entry.
    pub fees: Vec<Fee>,
    /// On-network settlement status, for entries that touch a network.
    pub network: Option<NetworkStatus>,
    /// Receiving counterparty.
    pub to: Option<AnyResource>,
    /// Sending counterparty.
    pub from: Option<AnyResource>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// An unexpanded reference to a transaction under an account.
    #[must_use]
    pub fn reference(account_id: impl AsRef<str>, id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!(
                "/accounts/{}/transactions/{}",
                account_id.as_ref(),
                id.as_ref()
            )),
            ..Self::default()
        }
    }
}

impl_resource!(Transaction);

static FIELDS: &[FieldDef<Transaction>] = &[
    FieldDef {
        wire_key: "type",
        set: |resource, value| resource.transaction_type = value.into_string(),
        get: |resource| resource.transaction_type.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "status",
        set: |resource, value| resource.status = value.into_string(),
        get: |resource| resource.status.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "amount",
        set: |resource, value| resource.amount = value.into_money(),
        get: |resource| resource.amount.clone().map(FieldValue::Money),
    },
    FieldDef {
        wire_key: "native_amount",
        set: |resource, value| resource.native_amount = value.into_money(),
        get: |resource| resource.native_amount.clone().map(FieldValue::Money),
    },
    FieldDef {
        wire_key: "description",
        set: |resource, value| resource.description = value.into_string(),
        get: |resource| resource.description.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "instant_exchange",
        set: |resource, value| resource.instant_exchange = value.into_bool(),
        get: |resource| resource.instant_exchange.map(FieldValue::bool),
    },
    FieldDef {
        wire_key: "fees",
        set: |resource, value| {
            resource.fees = value
                .into_list()
                .map(|items| items.into_iter().filter_map(Decoded::into_fee).collect())
                .unwrap_or_default();
        },
        get: |resource| {
            if resource.fees.is_empty() {
                None
            } else {
                Some(FieldValue::List(
                    resource.fees.iter().cloned().map(FieldValue::Fee).collect(),
                ))
            }
        },
    },
    FieldDef {
        wire_key: "network",
        set: |resource, value| resource.network = value.into_network(),
        get: |resource| resource.network.clone().map(FieldValue::Network),
    },
    FieldDef {
        wire_key: "to",
        set: |resource, value| resource.to = value.into_resource(),
        get: |resource| {
            resource
                .to
                .as_ref()
                .map(|counterparty| FieldValue::Reference(counterparty.inner().resource_ref()))
        },
    },
    FieldDef {
        wire_key: "from",
        set: |resource, value| resource.from = value.into_resource(),
        get: |resource| {
            resource
                .from
                .as_ref()
                .map(|counterparty| FieldValue::Reference(counterparty.inner().resource_ref()))
        },
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

impl MappedResource for Transaction {
    const KIND: ResourceKind = ResourceKind::Transaction;

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
