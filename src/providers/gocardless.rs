//! The GoCardless Bank Account Data adapter (formerly Nordigen).
//!
//! Calls `GET /api/v2/accounts/{id}/transactions/` with a bearer token and
//! merges the `booked` and `pending` groups into one list, tagging each
//! entry with the matching status.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::GoCardlessConfig,
    models::{Transaction, TransactionQuery, TransactionStatus},
    providers::{AdapterError, ProviderAdapter, parse_transaction_date},
};

/// Fetches transactions from the GoCardless Bank Account Data API.
pub struct GoCardlessAdapter {
    config: GoCardlessConfig,
    http: reqwest::Client,
}

impl GoCardlessAdapter {
    /// Create an adapter that authenticates with `config` and reuses `http`
    /// for its outbound calls.
    pub fn new(config: GoCardlessConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl ProviderAdapter for GoCardlessAdapter {
    async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AdapterError> {
        let account_id = query.required_filter("account_id")?;

        let response = self
            .http
            .get(format!(
                "{}/api/v2/accounts/{}/transactions/",
                self.config.base_url, account_id
            ))
            .bearer_auth(&self.config.access_token)
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

        let body: TransactionsEnvelope = response.json().await?;

        let booked = body
            .transactions
            .booked
            .into_iter()
            .map(|raw| normalize(raw, account_id, TransactionStatus::Posted));
        let pending = body
            .transactions
            .pending
            .into_iter()
            .map(|raw| normalize(raw, account_id, TransactionStatus::Pending));

        booked.chain(pending).collect()
    }
}

#[derive(Debug, Deserialize)]
struct TransactionsEnvelope {
    transactions: TransactionGroups,
}

#[derive(Debug, Deserialize)]
struct TransactionGroups {
    booked: Vec<GoCardlessTransaction>,
    #[serde(default)]
    pending: Vec<GoCardlessTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoCardlessTransaction {
    transaction_id: Option<String>,
    internal_transaction_id: Option<String>,
    transaction_amount: TransactionAmount,
    booking_date: Option<String>,
    value_date: Option<String>,
    remittance_information_unstructured: Option<String>,
    creditor_name: Option<String>,
    debtor_name: Option<String>,
    proprietary_bank_transaction_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionAmount {
    amount: String,
    currency: String,
}

fn normalize(
    raw: GoCardlessTransaction,
    account_id: &str,
    status: TransactionStatus,
) -> Result<Transaction, AdapterError> {
    let id = raw
        .transaction_id
        .or(raw.internal_transaction_id)
        .ok_or_else(|| AdapterError::Decode("transaction without an id".to_string()))?;

    // Pending entries often carry only a value date.
    let raw_date = raw
        .booking_date
        .or(raw.value_date)
        .ok_or_else(|| AdapterError::Decode("transaction without a date".to_string()))?;
    let date = parse_transaction_date(&raw_date)?;

    let amount: f64 = raw.transaction_amount.amount.parse().map_err(|_| {
        AdapterError::Decode(format!(
            "invalid amount \"{}\"",
            raw.transaction_amount.amount
        ))
    })?;

    let name = raw
        .creditor_name
        .or(raw.debtor_name)
        .or_else(|| raw.remittance_information_unstructured.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Transaction {
        id,
        account_id: account_id.to_string(),
        amount,
        currency: raw.transaction_amount.currency,
        date,
        name,
        description: raw.remittance_information_unstructured,
        method: raw.proprietary_bank_transaction_code,
        category: None,
        balance: None,
        status,
    })
}

#[cfg(test)]
mod gocardless_normalization_tests {
    use time::macros::date;

    use super::{TransactionsEnvelope, normalize};
    use crate::{models::TransactionStatus, providers::AdapterError};

    const ENVELOPE: &str = r#"{
        "transactions": {
            "booked": [
                {
                    "transactionId": "2024020301927902-1",
                    "transactionAmount": { "amount": "-30.50", "currency": "EUR" },
                    "bookingDate": "2024-02-03",
                    "valueDate": "2024-02-03",
                    "remittanceInformationUnstructured": "ALBERT HEIJN 1403 AMSTERDAM",
                    "creditorName": "Albert Heijn",
                    "proprietaryBankTransactionCode": "CARD_PAYMENT"
                }
            ],
            "pending": [
                {
                    "internalTransactionId": "c2a1f2b0",
                    "transactionAmount": { "amount": "-12.00", "currency": "EUR" },
                    "valueDate": "2024-02-05",
                    "remittanceInformationUnstructured": "NS GROEP IZ NS REIZIGERS"
                }
            ]
        }
    }"#;

    #[test]
    fn normalizes_booked_and_pending_groups() {
        let envelope: TransactionsEnvelope =
            serde_json::from_str(ENVELOPE).expect("fixture should deserialize");

        let booked = envelope
            .transactions
            .booked
            .into_iter()
            .next()
            .map(|raw| normalize(raw, "acc_nl_1", TransactionStatus::Posted).unwrap())
            .unwrap();

        assert_eq!(booked.id, "2024020301927902-1");
        assert_eq!(booked.account_id, "acc_nl_1");
        assert_eq!(booked.amount, -30.5);
        assert_eq!(booked.currency, "EUR");
        assert_eq!(booked.date, date!(2024 - 02 - 03));
        assert_eq!(booked.name, "Albert Heijn");
        assert_eq!(booked.method.as_deref(), Some("CARD_PAYMENT"));
        assert_eq!(booked.status, TransactionStatus::Posted);

        let envelope: TransactionsEnvelope =
            serde_json::from_str(ENVELOPE).expect("fixture should deserialize");
        let pending = envelope
            .transactions
            .pending
            .into_iter()
            .next()
            .map(|raw| normalize(raw, "acc_nl_1", TransactionStatus::Pending).unwrap())
            .unwrap();

        // No counterparty name, so the remittance line doubles as the name.
        assert_eq!(pending.name, "NS GROEP IZ NS REIZIGERS");
        assert_eq!(pending.id, "c2a1f2b0");
        assert_eq!(pending.date, date!(2024 - 02 - 05));
        assert_eq!(pending.status, TransactionStatus::Pending);
    }

    #[test]
    fn transaction_without_any_date_names_the_problem() {
        let envelope: TransactionsEnvelope = serde_json::from_str(
            r#"{
                "transactions": {
                    "booked": [
                        {
                            "transactionId": "tx_1",
                            "transactionAmount": { "amount": "-5.00", "currency": "EUR" }
                        }
                    ]
                }
            }"#,
        )
        .expect("fixture should deserialize");

        let result = envelope
            .transactions
            .booked
            .into_iter()
            .next()
            .map(|raw| normalize(raw, "acc_nl_1", TransactionStatus::Posted))
            .unwrap();

        assert_eq!(
            result,
            Err(AdapterError::Decode("transaction without a date".to_string()))
        );
    }

    #[test]
    fn missing_pending_group_defaults_to_empty() {
        let envelope: TransactionsEnvelope =
            serde_json::from_str(r#"{ "transactions": { "booked": [] } }"#)
                .expect("fixture should deserialize");

        assert!(envelope.transactions.pending.is_empty());
    }
}
