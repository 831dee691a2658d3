//! The Teller adapter.
//!
//! Teller authenticates with an mTLS client certificate plus an access token
//! sent as the basic-auth username, so this adapter builds its own HTTP
//! client instead of sharing the application-wide one.

use std::fs;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::TellerConfig,
    models::{Transaction, TransactionQuery, TransactionStatus},
    providers::{
        AdapterError, OUTBOUND_TIMEOUT, Provider, ProviderAdapter, parse_transaction_date,
    },
};

/// Fetches transactions from Teller's account transactions API.
pub struct TellerAdapter {
    config: TellerConfig,
    http: reqwest::Client,
}

impl TellerAdapter {
    /// Create an adapter from `config`, loading the mTLS identity from the
    /// configured certificate and key paths.
    ///
    /// # Errors
    /// Returns [AdapterError::Certificate] if the certificate or key cannot
    /// be read or do not form a valid identity.
    pub fn new(config: TellerConfig) -> Result<Self, AdapterError> {
        let identity = load_identity(&config)?;

        let http = reqwest::Client::builder()
            .identity(identity)
            .timeout(OUTBOUND_TIMEOUT)
            .build()
            .map_err(|error| AdapterError::Certificate(Provider::Teller, error.to_string()))?;

        Ok(Self { config, http })
    }
}

fn load_identity(config: &TellerConfig) -> Result<reqwest::Identity, AdapterError> {
    let certificate_error =
        |error: &dyn std::fmt::Display| AdapterError::Certificate(Provider::Teller, error.to_string());

    let mut pem = fs::read(&config.cert_path).map_err(|error| certificate_error(&error))?;
    let key = fs::read(&config.key_path).map_err(|error| certificate_error(&error))?;
    pem.extend_from_slice(&key);

    reqwest::Identity::from_pem(&pem).map_err(|error| certificate_error(&error))
}

#[async_trait]
impl ProviderAdapter for TellerAdapter {
    async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AdapterError> {
        let account_id = query.required_filter("account_id")?;

        let response = self
            .http
            .get(format!(
                "{}/accounts/{}/transactions",
                self.config.base_url, account_id
            ))
            // Teller expects the token as the username with a blank password.
            .basic_auth(&self.config.token, Some(""))
            .query(&query.filters_except("account_id"))
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

        let body: Vec<TellerTransaction> = response.json().await?;

        body.into_iter().map(normalize).collect()
    }
}

#[derive(Debug, Deserialize)]
struct TellerTransaction {
    id: String,
    account_id: String,
    amount: String,
    date: String,
    description: String,
    status: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    running_balance: Option<String>,
    details: Option<TellerDetails>,
}

#[derive(Debug, Deserialize)]
struct TellerDetails {
    category: Option<String>,
    counterparty: Option<TellerCounterparty>,
}

#[derive(Debug, Deserialize)]
struct TellerCounterparty {
    name: Option<String>,
}

fn normalize(raw: TellerTransaction) -> Result<Transaction, AdapterError> {
    let date = parse_transaction_date(&raw.date)?;

    // Teller sends amounts as signed decimal strings, already negative for
    // money out of the account.
    let amount: f64 = raw
        .amount
        .parse()
        .map_err(|_| AdapterError::Decode(format!("invalid amount \"{}\"", raw.amount)))?;

    let balance = raw
        .running_balance
        .as_deref()
        .and_then(|raw_balance| raw_balance.parse().ok());

    let status = if raw.status == "pending" {
        TransactionStatus::Pending
    } else {
        TransactionStatus::Posted
    };

    let (category, counterparty) = match raw.details {
        Some(details) => (
            details.category,
            details.counterparty.and_then(|counterparty| counterparty.name),
        ),
        None => (None, None),
    };

    let (name, description) = match counterparty {
        Some(counterparty) => (counterparty, Some(raw.description)),
        None => (raw.description, None),
    };

    Ok(Transaction {
        id: raw.id,
        account_id: raw.account_id,
        amount,
        currency: "USD".to_string(),
        date,
        name,
        description,
        method: raw.kind,
        category,
        balance,
        status,
    })
}

#[cfg(test)]
mod teller_normalization_tests {
    use time::macros::date;

    use super::{TellerTransaction, normalize};
    use crate::{models::TransactionStatus, providers::AdapterError};

    const TRANSACTIONS: &str = r#"[
        {
            "id": "txn_o3lvo4",
            "account_id": "acc_ohoqp9",
            "amount": "-42.37",
            "date": "2024-02-03",
            "description": "SQ *BLUE BOTTLE COFFEE",
            "status": "posted",
            "type": "card_payment",
            "running_balance": "1204.63",
            "details": {
                "category": "dining",
                "counterparty": { "name": "Blue Bottle Coffee" }
            }
        },
        {
            "id": "txn_o3lvo5",
            "account_id": "acc_ohoqp9",
            "amount": "1500.00",
            "date": "2024-02-04",
            "description": "PAYROLL",
            "status": "pending",
            "type": null,
            "running_balance": null,
            "details": null
        }
    ]"#;

    #[test]
    fn normalizes_teller_transactions() {
        let raw: Vec<TellerTransaction> =
            serde_json::from_str(TRANSACTIONS).expect("fixture should deserialize");

        let transactions: Vec<_> = raw
            .into_iter()
            .map(|transaction| normalize(transaction).expect("fixture rows should normalize"))
            .collect();

        let coffee = &transactions[0];
        assert_eq!(coffee.id, "txn_o3lvo4");
        assert_eq!(coffee.amount, -42.37);
        assert_eq!(coffee.date, date!(2024 - 02 - 03));
        assert_eq!(coffee.name, "Blue Bottle Coffee");
        assert_eq!(coffee.description.as_deref(), Some("SQ *BLUE BOTTLE COFFEE"));
        assert_eq!(coffee.method.as_deref(), Some("card_payment"));
        assert_eq!(coffee.category.as_deref(), Some("dining"));
        assert_eq!(coffee.balance, Some(1204.63));
        assert_eq!(coffee.status, TransactionStatus::Posted);

        let payroll = &transactions[1];
        assert_eq!(payroll.amount, 1500.0);
        assert_eq!(payroll.name, "PAYROLL");
        assert!(payroll.description.is_none());
        assert!(payroll.balance.is_none());
        assert_eq!(payroll.status, TransactionStatus::Pending);
    }

    #[test]
    fn rejects_unparseable_amounts() {
        let raw: Vec<TellerTransaction> = serde_json::from_str(
            r#"[
                {
                    "id": "txn_1",
                    "account_id": "acc_1",
                    "amount": "not-a-number",
                    "date": "2024-02-03",
                    "description": "???",
                    "status": "posted",
                    "type": null,
                    "running_balance": null,
                    "details": null
                }
            ]"#,
        )
        .expect("fixture should deserialize");

        let result = normalize(raw.into_iter().next().unwrap());

        assert_eq!(
            result,
            Err(AdapterError::Decode(
                "invalid amount \"not-a-number\"".to_string()
            ))
        );
    }
}
