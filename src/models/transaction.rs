//! This file defines the type `Transaction`, the normalized record that every
//! provider adapter produces, and the request/response envelopes for the
//! transactions route.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::providers::{AdapterError, Provider};

/// Whether a transaction has settled with the upstream institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The transaction has settled and its amount is final.
    Posted,
    /// The transaction is still being processed by the institution and may
    /// change amount or disappear entirely.
    Pending,
}

/// A single financial transaction, normalized to the shape shared by all
/// providers.
///
/// Amounts use the convention that money leaving the account is negative.
/// Providers that report outflows as positive numbers (e.g. Plaid) are
/// negated during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The upstream provider's identifier for this transaction.
    pub id: String,
    /// The upstream identifier of the account the transaction belongs to.
    pub account_id: String,
    /// The transaction amount in the account's currency. Negative is money
    /// out of the account.
    pub amount: f64,
    /// The ISO 4217 currency code, e.g. "USD".
    pub currency: String,
    /// The date the transaction was booked (or first seen, for pending
    /// transactions).
    pub date: Date,
    /// A short display name, usually the merchant or counterparty.
    pub name: String,
    /// The full upstream description, when it differs from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The payment method or channel, e.g. "card_payment", as reported
    /// upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// The upstream's category label, passed through untranslated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The account's running balance after this transaction, when the
    /// provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Whether the transaction is posted or still pending.
    pub status: TransactionStatus,
}

/// The query a provider adapter receives: which provider to call plus the
/// caller's filters.
///
/// The filters are opaque to the gateway. Each adapter picks out the keys it
/// understands (e.g. `account_id`, `access_token`, `cursor`) and forwards
/// the rest to the upstream API unchanged.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    /// The upstream source that should serve this query.
    pub provider: Provider,
    /// Provider-specific filters, passed through from the request's query
    /// string minus the `provider` key.
    pub filters: HashMap<String, String>,
}

impl TransactionQuery {
    /// Look up a filter that the selected adapter cannot work without.
    pub fn required_filter(&self, key: &'static str) -> Result<&str, AdapterError> {
        self.filters
            .get(key)
            .map(String::as_str)
            .ok_or(AdapterError::MissingFilter(key))
    }

    /// The filters that are not `key`, for forwarding to the upstream as
    /// query parameters.
    pub fn filters_except(&self, key: &str) -> Vec<(&str, &str)> {
        self.filters
            .iter()
            .filter(|(name, _)| name.as_str() != key)
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}

/// The success payload of the transactions route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionsResponse {
    /// The normalized transactions, in whatever order the upstream returned
    /// them.
    pub data: Vec<Transaction>,
}

/// The failure payload of the transactions route.
///
/// The message is intentionally generic. The real cause is logged on the
/// server and never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// A human-readable message describing the failure.
    pub message: String,
}
