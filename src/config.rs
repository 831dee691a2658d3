//! Environment-derived configuration for the provider adapters.
//!
//! Credentials are optional at startup: a provider with no credentials in
//! the environment simply cannot be selected at request time.

use std::{env, path::PathBuf};

/// Default Plaid environment. Production deployments override this with
/// `PLAID_BASE_URL`.
const PLAID_DEFAULT_BASE_URL: &str = "https://sandbox.plaid.com";
const TELLER_DEFAULT_BASE_URL: &str = "https://api.teller.io";
const GOCARDLESS_DEFAULT_BASE_URL: &str = "https://bankaccountdata.gocardless.com";

/// Credentials and endpoint for the Plaid adapter.
#[derive(Debug, Clone)]
pub struct PlaidConfig {
    /// The Plaid client ID.
    pub client_id: String,
    /// The Plaid API secret for the selected environment.
    pub secret: String,
    /// The API origin, e.g. "https://sandbox.plaid.com".
    pub base_url: String,
}

/// Credentials and endpoint for the Teller adapter.
#[derive(Debug, Clone)]
pub struct TellerConfig {
    /// The Teller access token, sent as the basic-auth username.
    pub token: String,
    /// Path to the PEM-encoded client certificate Teller issued.
    pub cert_path: PathBuf,
    /// Path to the PEM-encoded private key for the client certificate.
    pub key_path: PathBuf,
    /// The API origin, e.g. "https://api.teller.io".
    pub base_url: String,
}

/// Credentials and endpoint for the GoCardless Bank Account Data adapter.
#[derive(Debug, Clone)]
pub struct GoCardlessConfig {
    /// A pre-provisioned bearer token for the Bank Account Data API.
    pub access_token: String,
    /// The API origin, e.g. "https://bankaccountdata.gocardless.com".
    pub base_url: String,
}

/// The configuration for every provider the gateway can dispatch to.
///
/// A `None` entry means the provider's credentials were absent from the
/// environment; requests selecting that provider fail at adapter
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Plaid credentials, from `PLAID_CLIENT_ID`/`PLAID_SECRET`.
    pub plaid: Option<PlaidConfig>,
    /// Teller credentials, from `TELLER_TOKEN`/`TELLER_CERT_PATH`/`TELLER_KEY_PATH`.
    pub teller: Option<TellerConfig>,
    /// GoCardless credentials, from `GOCARDLESS_ACCESS_TOKEN`.
    pub gocardless: Option<GoCardlessConfig>,
}

impl ProviderConfig {
    /// Read the provider configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let plaid = match (get("PLAID_CLIENT_ID"), get("PLAID_SECRET")) {
            (Some(client_id), Some(secret)) => Some(PlaidConfig {
                client_id,
                secret,
                base_url: get("PLAID_BASE_URL")
                    .unwrap_or_else(|| PLAID_DEFAULT_BASE_URL.to_string()),
            }),
            _ => None,
        };

        let teller = match (
            get("TELLER_TOKEN"),
            get("TELLER_CERT_PATH"),
            get("TELLER_KEY_PATH"),
        ) {
            (Some(token), Some(cert_path), Some(key_path)) => Some(TellerConfig {
                token,
                cert_path: PathBuf::from(cert_path),
                key_path: PathBuf::from(key_path),
                base_url: get("TELLER_BASE_URL")
                    .unwrap_or_else(|| TELLER_DEFAULT_BASE_URL.to_string()),
            }),
            _ => None,
        };

        let gocardless = get("GOCARDLESS_ACCESS_TOKEN").map(|access_token| GoCardlessConfig {
            access_token,
            base_url: get("GOCARDLESS_BASE_URL")
                .unwrap_or_else(|| GOCARDLESS_DEFAULT_BASE_URL.to_string()),
        });

        Self {
            plaid,
            teller,
            gocardless,
        }
    }
}
