//! The Plaid adapter.
//!
//! Calls `POST /transactions/sync` and normalizes the `added` entries.
//! Plaid reports money leaving the account as a positive amount, so amounts
//! are negated to match the gateway's sign convention.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::PlaidConfig,
    models::{Transaction, TransactionQuery, TransactionStatus},
    providers::{AdapterError, ProviderAdapter, parse_transaction_date},
};

/// Fetches transactions through Plaid's sync API.
pub struct PlaidAdapter {
    config: PlaidConfig,
    http: reqwest::Client,
}

impl PlaidAdapter {
    /// Create an adapter that authenticates with `config` and reuses `http`
    /// for its outbound calls.
    pub fn new(config: PlaidConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl ProviderAdapter for PlaidAdapter {
    async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AdapterError> {
        let access_token = query.required_filter("access_token")?;

        let request = SyncRequest {
            client_id: &self.config.client_id,
            secret: &self.config.secret,
            access_token,
            cursor: query.filters.get("cursor").map(String::as_str),
            count: query.filters.get("count").and_then(|raw| raw.parse().ok()),
        };

        let response = self
            .http
            .post(format!("{}/transactions/sync", self.config.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(AdapterError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: SyncResponse = response.json().await?;

        body.added.into_iter().map(normalize).collect()
    }
}

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    added: Vec<PlaidTransaction>,
}

#[derive(Debug, Deserialize)]
struct PlaidTransaction {
    transaction_id: String,
    account_id: String,
    amount: f64,
    iso_currency_code: Option<String>,
    unofficial_currency_code: Option<String>,
    date: String,
    name: String,
    merchant_name: Option<String>,
    payment_channel: Option<String>,
    pending: bool,
    personal_finance_category: Option<PersonalFinanceCategory>,
}

#[derive(Debug, Deserialize)]
struct PersonalFinanceCategory {
    primary: String,
}

fn normalize(raw: PlaidTransaction) -> Result<Transaction, AdapterError> {
    let date = parse_transaction_date(&raw.date)?;

    let currency = raw
        .iso_currency_code
        .or(raw.unofficial_currency_code)
        .unwrap_or_else(|| "USD".to_string());

    let status = if raw.pending {
        TransactionStatus::Pending
    } else {
        TransactionStatus::Posted
    };

    let (name, description) = match raw.merchant_name {
        Some(merchant) => (merchant, Some(raw.name)),
        None => (raw.name, None),
    };

    Ok(Transaction {
        id: raw.transaction_id,
        account_id: raw.account_id,
        // Plaid: positive = outflow. Flip to the normalized convention.
        amount: -raw.amount,
        currency,
        date,
        name,
        description,
        method: raw.payment_channel,
        category: raw.personal_finance_category.map(|category| category.primary),
        balance: None,
        status,
    })
}
