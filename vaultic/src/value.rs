//! Immutable value objects shared across the Vaultic wire format.
//!
//! These types mirror the JSON shapes the API uses for monetary amounts,
//! fees, network settlement status, and error entries. They are plain data:
//! constructed once, never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount in a specific currency.
///
/// The amount is kept as the server-issued decimal string so financial
/// quantities never pass through floating point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: String,
    currency: String,
}

impl Money {
    /// Creates a new amount in the given ISO currency.
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
        }
    }

    /// The decimal amount string, e.g. `"39.59000000"`.
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// The ISO currency code, e.g. `"USD"`.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// A single fee line attached to a transaction or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(rename = "type")]
    fee_type: String,
    amount: Money,
}

impl Fee {
    /// Creates a fee of the given type.
    pub fn new(fee_type: impl Into<String>, amount: Money) -> Self {
        Self {
            fee_type: fee_type.into(),
            amount,
        }
    }

    /// The fee type tag, e.g. `"network"` or `"vaultic"`.
    #[must_use]
    pub fn fee_type(&self) -> &str {
        &self.fee_type
    }

    /// The fee amount.
    #[must_use]
    pub fn amount(&self) -> &Money {
        &self.amount
    }
}

/// Settlement status of a transaction on its underlying payment network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    status: String,
    #[serde(rename = "hash", default, skip_serializing_if = "Option::is_none")]
    tx_hash: Option<String>,
    #[serde(
        rename = "transaction_fee",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    network_fee: Option<Money>,
}

impl NetworkStatus {
    /// Creates a status with neither hash nor fee.
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            tx_hash: None,
            network_fee: None,
        }
    }

    /// Sets the network transaction hash.
    #[must_use]
    pub fn with_tx_hash(mut self, hash: impl Into<String>) -> Self {
        self.tx_hash = Some(hash.into());
        self
    }

    /// Sets the fee charged by the network.
    #[must_use]
    pub fn with_network_fee(mut self, fee: Money) -> Self {
        self.network_fee = Some(fee);
        self
    }

    /// The network status, e.g. `"confirmed"` or `"pending"`.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The network transaction hash, once broadcast.
    #[must_use]
    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    /// The fee charged by the network, if reported.
    #[must_use]
    pub fn network_fee(&self) -> Option<&Money> {
        self.network_fee.as_ref()
    }
}

/// One error entry from an API error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    id: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl ApiError {
    /// Creates an error entry.
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            url: None,
        }
    }

    /// Attaches the documentation link the server included.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The machine-readable error code, e.g. `"param_required"`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// A documentation link for this error, when the server provides one.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{} ({url})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_wire_shape() {
        let money = Money::new("39.59", "USD");
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(json, serde_json::json!({"amount": "39.59", "currency": "USD"}));
    }

    #[test]
    fn test_fee_wire_shape_uses_type_key() {
        let fee = Fee::new("network", Money::new("0.10", "USD"));
        let json = serde_json::to_value(&fee).unwrap();
        assert_eq!(json["type"], "network");
        assert_eq!(json["amount"]["amount"], "0.10");
    }

    #[test]
    fn test_network_status_decodes_hash_and_fee() {
        let network: NetworkStatus = serde_json::from_value(serde_json::json!({
            "status": "confirmed",
            "hash": "0xabc",
            "transaction_fee": {"amount": "0.0001", "currency": "BTC"}
        }))
        .unwrap();
        assert_eq!(network.status(), "confirmed");
        assert_eq!(network.tx_hash(), Some("0xabc"));
        assert_eq!(network.network_fee().unwrap().currency(), "BTC");
    }

    #[test]
    fn test_api_error_display_includes_url() {
        let error = ApiError::new("invalid_request", "Missing parameter")
            .with_url("https://docs.vaultic.com/errors#invalid_request");
        assert_eq!(
            error.to_string(),
            "Missing parameter (https://docs.vaultic.com/errors#invalid_request)"
        );
    }
}
