//! Users: the authenticated user or a transaction counterparty.

use chrono::{DateTime, Utc};

use crate::codec::{FieldDef, FieldValue};
use crate::resource::{MappedResource, ResourceBase, ResourceKind, impl_resource};

/// A user profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub(crate) base: ResourceBase,
    /// Display name.
    pub name: Option<String>,
    /// Public username.
    pub username: Option<String>,
    /// Email address; only visible on the authenticated user.
    pub email: Option<String>,
    /// IANA time zone name.
    pub time_zone: Option<String>,
    /// Preferred display currency.
    pub native_currency: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// An unexpanded reference to the user with the given id.
    #[must_use]
    pub fn reference(id: impl AsRef<str>) -> Self {
        Self {
            base: ResourceBase::from_path(format!("/users/{}", id.as_ref())),
            ..Self::default()
        }
    }
}

impl_resource!(User);

static FIELDS: &[FieldDef<User>] = &[
    FieldDef {
        wire_key: "name",
        set: |resource, value| resource.name = value.into_string(),
        get: |resource| resource.name.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "username",
        set: |resource, value| resource.username = value.into_string(),
        get: |resource| resource.username.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "email",
        set: |resource, value| resource.email = value.into_string(),
        get: |resource| resource.email.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "time_zone",
        set: |resource, value| resource.time_zone = value.into_string(),
        get: |resource| resource.time_zone.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "native_currency",
        set: |resource, value| resource.native_currency = value.into_string(),
        get: |resource| resource.native_currency.clone().map(FieldValue::string),
    },
    FieldDef {
        wire_key: "avatar_url",
        set: |resource, value| resource.avatar_url = value.into_string(),
        get: |resource| resource.avatar_url.clone().map(FieldValue::string),
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

impl MappedResource for User {
    const KIND: ResourceKind = ResourceKind::User;

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
