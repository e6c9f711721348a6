//! Merchant orders.

use chrono::{DateTime, Utc};

use crate::codec::{FieldDef, FieldValue};
use crate::resource::{MappedResource, ResourceBase, ResourceKind, impl_resource};
use crate::value::Money;

/// A payment order created by a merchant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub(crate) base: ResourceBase,
    /// Order name shown to the payer.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Lifecycle status, such as `active` or `paid`.
    pub status: Option<String>,
    /// Amount requested.
    pub amount: Option<Money>,
    /// Amount received so far.
    pub total: Option<Money>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// An unexpanded reference to the order with the given id.
    #[must_use]
    pub fn reference(id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!("/orders/{}", id.as_ref())),
            ..Self::default()
        }
    }
}

impl_resource!(Order);

static FIELDS: &[FieldDef<Order>] = &[
    FieldDef {
        wire_key: "name",
        set: |resource, value| resource.name = value.into_string(),
        get: |resource| resource.name.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "description",
        set: |resource, value| resource.description = value.into_string(),
        get: |resource| resource.description.clone().map(FieldValue::string),
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
        wire_key: "total",
        set: |resource, value| resource.total = value.into_money(),
        get: |resource| resource.total.clone().map(FieldValue::Money),
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

impl MappedResource for Order {
    const KIND: ResourceKind = ResourceKind::Order;

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
