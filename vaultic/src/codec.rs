//! Bidirectional mapping between wire JSON and typed resources.
//!
//! Decoding walks a resource type's static field table ([`FieldDef`]) and
//! converts each recognized wire value into a [`Decoded`] variant by
//! shape: `_at` strings become timestamps, `{amount, currency}` maps
//! become [`Money`], tagged maps become nested resources, and so on.
//! Encoding walks the same table in reverse through [`FieldValue`].
//!
//! Nested resource dispatch goes through a [`ResourceRegistry`] keyed by
//! the wire `resource` tag, so a field typed as "any resource" resolves
//! to the right concrete type at runtime.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::collection::ResourceCollection;
use crate::resource::{
    Account, Address, AnyResource, JsonObject, MappedResource, Order, PaymentMethod, ResourceRef,
    Transaction, User,
};
use crate::value::{Fee, Money, NetworkStatus};

/// Errors raised while mapping wire JSON to or from resources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The body was not valid JSON, or did not match the expected
    /// envelope.
    #[error("malformed body: {0}")]
    Json(#[from] serde_json::Error),

    /// A `_at` field carried a string that is not an RFC 3339 timestamp.
    #[error("invalid timestamp in field `{field}`: {source}")]
    Timestamp {
        /// Wire key of the offending field.
        field: String,
        /// Underlying parse failure.
        source: chrono::ParseError,
    },

    /// A nested resource carried a tag no registered type claims.
    #[error("unknown resource kind `{0}`")]
    UnknownResourceKind(String),

    /// A nested resource's `resource` tag was not a string.
    #[error("resource tag is not a string")]
    InvalidResourceTag,
}

/// One mapped wire field of a resource type.
///
/// The setter receives an already-decoded value and keeps whatever part
/// of it matches its field's type; a shape mismatch leaves the field
/// empty rather than failing the whole decode. The getter produces the
/// encodable value, or `None` when the field is unset.
pub struct FieldDef<T> {
    /// JSON key on the wire.
    pub wire_key: &'static str,
    /// Applies a decoded wire value to the resource.
    pub set: fn(&mut T, Decoded),
    /// Reads the field back out for encoding.
    pub get: fn(&T) -> Option<FieldValue>,
}

/// A wire value after shape-driven decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A JSON scalar, passed through untouched.
    Scalar(Value),
    /// An RFC 3339 timestamp from a `_at` field.
    Timestamp(DateTime<Utc>),
    /// An `{amount, currency}` pair.
    Money(Money),
    /// A typed fee entry.
    Fee(Fee),
    /// An on-network settlement status.
    Network(NetworkStatus),
    /// A tagged nested resource, expanded or not.
    Resource(AnyResource),
    /// A JSON array with each element decoded.
    List(Vec<Decoded>),
    /// A map that matched no known shape, passed through untouched.
    Opaque(JsonObject),
}

impl Decoded {
    /// The scalar string, if that is what this is.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Scalar(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// The scalar boolean, if that is what this is.
    #[must_use]
    pub fn into_bool(self) -> Option<bool> {
        match self {
            Self::Scalar(Value::Bool(flag)) => Some(flag),
            _ => None,
        }
    }

    /// The timestamp, if that is what this is.
    #[must_use]
    pub fn into_timestamp(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// The money value, if that is what this is.
    #[must_use]
    pub fn into_money(self) -> Option<Money> {
        match self {
            Self::Money(money) => Some(money),
            _ => None,
        }
    }

    /// The fee, if that is what this is.
    #[must_use]
    pub fn into_fee(self) -> Option<Fee> {
        match self {
            Self::Fee(fee) => Some(fee),
            _ => None,
        }
    }

    /// The network status, if that is what this is.
    #[must_use]
    pub fn into_network(self) -> Option<NetworkStatus> {
        match self {
            Self::Network(network) => Some(network),
            _ => None,
        }
    }

    /// The nested resource, if that is what this is.
    #[must_use]
    pub fn into_resource(self) -> Option<AnyResource> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// The decoded list elements, if this is a list.
    #[must_use]
    pub fn into_list(self) -> Option<Vec<Decoded>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A field value on its way back to the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A JSON scalar, emitted as-is.
    Scalar(Value),
    /// A timestamp, emitted as RFC 3339 UTC.
    Timestamp(DateTime<Utc>),
    /// A money pair.
    Money(Money),
    /// A fee entry.
    Fee(Fee),
    /// A network status; only its status and hash go on the wire.
    Network(NetworkStatus),
    /// A nested resource, emitted as its identity triple.
    Reference(ResourceRef),
    /// A list of encodable values.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// A scalar string value.
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::Scalar(Value::String(text.into()))
    }

    /// A scalar boolean value.
    #[must_use]
    pub fn bool(flag: bool) -> Self {
        Self::Scalar(Value::Bool(flag))
    }
}

type DecodeFn = fn(&Mapper, &JsonObject) -> Result<AnyResource, CodecError>;

/// Dispatch table from wire `resource` tags to concrete decoders.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    handlers: HashMap<&'static str, DecodeFn>,
}

impl ResourceRegistry {
    /// A registry with no types; callers register their own.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The registry covering every built-in resource type.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("account", |mapper, data| mapper.decode_nested::<Account>(data));
        registry.register("address", |mapper, data| mapper.decode_nested::<Address>(data));
        registry.register("transaction", |mapper, data| {
            mapper.decode_nested::<Transaction>(data)
        });
        registry.register("order", |mapper, data| mapper.decode_nested::<Order>(data));
        registry.register("user", |mapper, data| mapper.decode_nested::<User>(data));
        registry.register("payment_method", |mapper, data| {
            mapper.decode_nested::<PaymentMethod>(data)
        });
        registry
    }

    /// Registers a decoder for a wire tag, replacing any existing one.
    pub fn register(&mut self, tag: &'static str, decode: DecodeFn) {
        self.handlers.insert(tag, decode);
    }

    fn get(&self, tag: &str) -> Option<DecodeFn> {
        self.handlers.get(tag).copied()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Deserialize)]
struct DataEnvelope {
    data: JsonObject,
}

#[derive(Deserialize)]
struct ListEnvelope {
    data: Vec<JsonObject>,
    #[serde(default)]
    pagination: Option<PageInfo>,
}

#[derive(Deserialize, Default)]
struct PageInfo {
    #[serde(default)]
    previous_uri: Option<String>,
    #[serde(default)]
    next_uri: Option<String>,
}

/// The resource codec.
#[derive(Debug, Clone)]
pub struct Mapper {
    registry: ResourceRegistry,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// A mapper over the built-in resource registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ResourceRegistry::builtin(),
        }
    }

    /// A mapper over a caller-supplied registry.
    #[must_use]
    pub fn with_registry(registry: ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Decodes a `{"data": {...}}` body into a fresh resource.
    ///
    /// # Errors
    ///
    /// [`CodecError`] when the body is not valid JSON, is not shaped as a
    /// data envelope, or a mapped field fails to decode.
    pub fn to_resource<T: MappedResource>(&self, body: &str) -> Result<T, CodecError> {
        let envelope: DataEnvelope = serde_json::from_str(body)?;
        let mut resource = T::default();
        self.inject(&mut resource, &envelope.data)?;
        Ok(resource)
    }

    /// Decodes a `{"data": {...}}` body into an existing resource,
    /// refreshing its fields in place.
    ///
    /// # Errors
    ///
    /// Same conditions as [`to_resource`](Self::to_resource).
    pub fn refresh_resource<T: MappedResource>(
        &self,
        resource: &mut T,
        body: &str,
    ) -> Result<(), CodecError> {
        let envelope: DataEnvelope = serde_json::from_str(body)?;
        self.inject(resource, &envelope.data)
    }

    /// Decodes a `{"data": [...], "pagination": {...}}` body into a page
    /// of resources.
    ///
    /// # Errors
    ///
    /// [`CodecError`] when the body is not a valid list envelope or any
    /// element fails to decode.
    pub fn to_collection<T: MappedResource>(
        &self,
        body: &str,
    ) -> Result<ResourceCollection<T>, CodecError> {
        let envelope: ListEnvelope = serde_json::from_str(body)?;
        let page = envelope.pagination.unwrap_or_default();
        let mut collection = ResourceCollection::new(page.previous_uri, page.next_uri);
        for data in &envelope.data {
            let mut resource = T::default();
            self.inject(&mut resource, data)?;
            collection.push(resource);
        }
        Ok(collection)
    }

    /// Extracts the raw object out of a `{"data": {...}}` body without
    /// mapping it.
    ///
    /// # Errors
    ///
    /// [`CodecError::Json`] when the body is not a valid data envelope.
    pub fn to_data(&self, body: &str) -> Result<JsonObject, CodecError> {
        let envelope: DataEnvelope = serde_json::from_str(body)?;
        Ok(envelope.data)
    }

    /// Decodes a `{"data": {"amount": ..., "currency": ...}}` body.
    ///
    /// # Errors
    ///
    /// [`CodecError::Json`] when the envelope or money pair is malformed.
    pub fn to_money(&self, body: &str) -> Result<Money, CodecError> {
        let envelope: DataEnvelope = serde_json::from_str(body)?;
        Ok(serde_json::from_value(Value::Object(envelope.data))?)
    }

    /// Populates a resource from a decoded wire object.
    ///
    /// The raw object is retained first, then identity, then every field
    /// the type's table recognizes. Unrecognized keys stay reachable
    /// through the raw object only.
    ///
    /// # Errors
    ///
    /// [`CodecError`] when a recognized field's value fails to decode.
    pub fn inject<T: MappedResource>(
        &self,
        resource: &mut T,
        data: &JsonObject,
    ) -> Result<(), CodecError> {
        resource.base_mut().set_raw(data.clone());
        if let Some(Value::String(id)) = data.get("id") {
            resource.base_mut().set_id_if_unset(id.clone());
        }
        if let Some(Value::String(path)) = data.get("resource_path") {
            resource.base_mut().set_resource_path(path.clone());
        }
        for field in T::fields() {
            if let Some(value) = data.get(field.wire_key) {
                let decoded = self.decode_value(field.wire_key, value)?;
                (field.set)(resource, decoded);
            }
        }
        Ok(())
    }

    /// Decodes one wire value by shape.
    fn decode_value(&self, key: &str, value: &Value) -> Result<Decoded, CodecError> {
        match value {
            Value::String(text) if key.ends_with("_at") => {
                let timestamp = DateTime::parse_from_rfc3339(text).map_err(|source| {
                    CodecError::Timestamp {
                        field: key.to_owned(),
                        source,
                    }
                })?;
                Ok(Decoded::Timestamp(timestamp.with_timezone(&Utc)))
            }
            Value::Array(items) => {
                let decoded = items
                    .iter()
                    .map(|item| self.decode_value(key, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Decoded::List(decoded))
            }
            Value::Object(map) => self.decode_object(key, map),
            scalar => Ok(Decoded::Scalar(scalar.clone())),
        }
    }

    /// Classifies a wire map by shape, in fixed precedence order.
    fn decode_object(&self, key: &str, map: &JsonObject) -> Result<Decoded, CodecError> {
        if map.contains_key("resource") {
            return Ok(Decoded::Resource(self.decode_resource(map)?));
        }
        if is_money(map) {
            let money = serde_json::from_value(Value::Object(map.clone()))?;
            return Ok(Decoded::Money(money));
        }
        if key == "network" && map.contains_key("status") {
            let network = serde_json::from_value(Value::Object(map.clone()))?;
            return Ok(Decoded::Network(network));
        }
        if is_fee(map) {
            let fee = serde_json::from_value(Value::Object(map.clone()))?;
            return Ok(Decoded::Fee(fee));
        }
        Ok(Decoded::Opaque(map.clone()))
    }

    /// Dispatches a tagged map through the registry.
    fn decode_resource(&self, map: &JsonObject) -> Result<AnyResource, CodecError> {
        let tag = map
            .get("resource")
            .and_then(Value::as_str)
            .ok_or(CodecError::InvalidResourceTag)?;
        let decode = self
            .registry
            .get(tag)
            .ok_or_else(|| CodecError::UnknownResourceKind(tag.to_owned()))?;
        decode(self, map)
    }

    /// Decodes a tagged map as a concrete nested resource.
    ///
    /// A map carrying only identity keys stays an unexpanded reference;
    /// anything more is fully injected.
    ///
    /// # Errors
    ///
    /// [`CodecError`] when an expanded map's fields fail to decode.
    pub fn decode_nested<T>(&self, data: &JsonObject) -> Result<AnyResource, CodecError>
    where
        T: MappedResource + Into<AnyResource>,
    {
        let mut resource = T::default();
        if is_reference(data) {
            if let Some(Value::String(id)) = data.get("id") {
                resource.base_mut().set_id_if_unset(id.clone());
            }
            if let Some(Value::String(path)) = data.get("resource_path") {
                resource.base_mut().set_resource_path(path.clone());
            }
        } else {
            self.inject(&mut resource, data)?;
        }
        Ok(resource.into())
    }

    /// Encodes a resource back to a wire object: identity triple first,
    /// then every set field from the type's table.
    #[must_use]
    pub fn extract<T: MappedResource>(&self, resource: &T) -> JsonObject {
        let mut map = JsonObject::new();
        if let Some(id) = resource.base().id() {
            map.insert("id".to_owned(), Value::String(id.to_owned()));
        }
        map.insert(
            "resource".to_owned(),
            Value::String(T::KIND.as_str().to_owned()),
        );
        if let Some(path) = resource.base().resource_path() {
            map.insert("resource_path".to_owned(), Value::String(path.to_owned()));
        }
        for field in T::fields() {
            if let Some(value) = (field.get)(resource) {
                map.insert(field.wire_key.to_owned(), encode_value(value));
            }
        }
        map
    }
}

/// Encodes one field value back to wire JSON.
fn encode_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Scalar(scalar) => scalar,
        FieldValue::Timestamp(timestamp) => {
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        FieldValue::Money(money) => serde_json::json!({
            "amount": money.amount(),
            "currency": money.currency(),
        }),
        FieldValue::Fee(fee) => serde_json::json!({
            "type": fee.fee_type(),
            "amount": {
                "amount": fee.amount().amount(),
                "currency": fee.amount().currency(),
            },
        }),
        FieldValue::Network(network) => {
            // Fee details are server-derived and never round-trip.
            let mut map = JsonObject::new();
            map.insert(
                "status".to_owned(),
                Value::String(network.status().to_owned()),
            );
            if let Some(hash) = network.tx_hash() {
                map.insert("hash".to_owned(), Value::String(hash.to_owned()));
            }
            Value::Object(map)
        }
        FieldValue::Reference(reference) => {
            let mut map = JsonObject::new();
            if let Some(id) = reference.id {
                map.insert("id".to_owned(), Value::String(id));
            }
            map.insert(
                "resource".to_owned(),
                Value::String(reference.kind.as_str().to_owned()),
            );
            if let Some(path) = reference.resource_path {
                map.insert("resource_path".to_owned(), Value::String(path));
            }
            Value::Object(map)
        }
        FieldValue::List(items) => Value::Array(items.into_iter().map(encode_value).collect()),
    }
}

/// Whether a map carries only the identity triple keys.
fn is_reference(map: &JsonObject) -> bool {
    map.keys()
        .all(|key| matches!(key.as_str(), "id" | "resource" | "resource_path"))
}

fn is_money(map: &JsonObject) -> bool {
    map.len() == 2
        && matches!(map.get("amount"), Some(Value::String(_)))
        && matches!(map.get("currency"), Some(Value::String(_)))
}

fn is_fee(map: &JsonObject) -> bool {
    map.contains_key("type")
        && map
            .get("amount")
            .and_then(Value::as_object)
            .is_some_and(is_money)
}
