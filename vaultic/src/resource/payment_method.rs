//! Payment methods: linked funding sources for buys and sells.

use chrono::{DateTime, Utc};

use crate::codec::{FieldDef, FieldValue};
use crate::resource::{MappedResource, ResourceBase, ResourceKind, impl_resource};

/// A linked bank account, card, or wallet usable for buys and sells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentMethod {
    pub(crate) base: ResourceBase,
    /// Funding source flavor, such as `ach_bank_account`.
    pub payment_method_type: Option<String>,
    /// User-visible name.
    pub name: Option<String>,
    /// Currency this method funds in.
    pub currency: Option<String>,
    /// Whether this is the default method for buys.
    pub primary_buy: Option<bool>,
    /// Whether this is the default method for sells.
    pub primary_sell: Option<bool>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentMethod {
    /// An unexpanded reference to the payment method with the given id.
    #[must_use]
    pub fn reference(id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!("/payment-methods/{}", id.as_ref())),
            ..Self::default()
        }
    }
}

impl_resource!(PaymentMethod);

static FIELDS: &[FieldDef<PaymentMethod>] = &[
    FieldDef {
        wire_key: "type",
        set: |resource, value| resource.payment_method_type = value.into_string(),
        get: |resource| resource.payment_method_type.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "name",
        set: |resource, value| resource.name = value.into_string(),
        get: |resource| resource.name.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "currency",
        set: |resource, value| resource.currency = value.into_string(),
        get: |resource| resource.currency.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "primary_buy",
        set: |resource, value| resource.primary_buy = value.into_bool(),
        get: |resource| resource.primary_buy.map(FieldValue::bool),
    },
    FieldDef {
        wire_key: "primary_sell",
        set: |resource, value| resource.primary_sell = value.into_bool(),
        get: |resource| resource.primary_sell.map(FieldValue::bool),
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

impl MappedResource for PaymentMethod {
    const KIND: ResourceKind = ResourceKind::PaymentMethod;

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
