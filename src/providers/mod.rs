//! Contains the trait for provider adapters and the implementations for each
//! supported upstream financial-data provider.

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use time::{Date, macros::format_description};

use crate::{
    config::ProviderConfig,
    models::{Transaction, TransactionQuery},
};

mod gocardless;
mod plaid;
mod teller;

pub use gocardless::GoCardlessAdapter;
pub use plaid::PlaidAdapter;
pub use teller::TellerAdapter;

/// The closed set of upstream financial-data providers the gateway can
/// dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Plaid (US/CA bank aggregation).
    Plaid,
    /// Teller (US bank aggregation over mTLS).
    Teller,
    /// GoCardless Bank Account Data, formerly Nordigen (EU/UK open banking).
    GoCardless,
}

impl Provider {
    /// Every supported provider, in dispatch order.
    pub const ALL: [Provider; 3] = [Provider::Plaid, Provider::Teller, Provider::GoCardless];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Plaid => "plaid",
            Provider::Teller => "teller",
            Provider::GoCardless => "gocardless",
        };

        write!(f, "{name}")
    }
}

impl FromStr for Provider {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaid" => Ok(Provider::Plaid),
            "teller" => Ok(Provider::Teller),
            "gocardless" => Ok(Provider::GoCardless),
            other => Err(AdapterError::UnknownProvider(other.to_string())),
        }
    }
}

/// The errors that may occur while selecting, constructing, or calling a
/// provider adapter.
///
/// These are classified for the server logs only. At the route boundary
/// every variant collapses into the same generic client-facing error so
/// that internal detail is never leaked to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// The `provider` query parameter did not name a supported provider.
    #[error("unknown provider \"{0}\"")]
    UnknownProvider(String),

    /// The selected provider has no credentials in the environment.
    #[error("{provider} is not configured: set {variables}")]
    NotConfigured {
        /// The provider that was requested.
        provider: Provider,
        /// The environment variables an operator needs to set.
        variables: &'static str,
    },

    /// The provider's client certificate could not be loaded.
    #[error("could not load the {0} client certificate: {1}")]
    Certificate(Provider, String),

    /// The query was missing a filter the selected adapter cannot work
    /// without.
    #[error("the query is missing the required \"{0}\" filter")]
    MissingFilter(&'static str),

    /// The outbound request failed before a response arrived (DNS, connect,
    /// timeout).
    #[error("upstream request failed: {0}")]
    Network(String),

    /// The upstream responded with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Upstream {
        /// The upstream HTTP status code.
        status: u16,
        /// The upstream response body, for the server logs.
        body: String,
    },

    /// The upstream response body could not be decoded as the expected JSON.
    #[error("could not decode the upstream response: {0}")]
    Decode(String),

    /// A transaction date did not parse as a calendar date.
    #[error("could not parse transaction date \"{0}\"")]
    InvalidDate(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            AdapterError::Decode(value.to_string())
        } else {
            AdapterError::Network(value.to_string())
        }
    }
}

/// How long an adapter waits for the upstream before giving up. There is no
/// retry; a timeout surfaces as a normal adapter failure.
pub(crate) const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse the `YYYY-MM-DD` date strings all three providers use.
pub(crate) fn parse_transaction_date(raw: &str) -> Result<Date, AdapterError> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(raw, &format).map_err(|_| AdapterError::InvalidDate(raw.to_string()))
}

/// The capability every upstream source implements: translate an opaque
/// query into a provider-specific API call and normalize the response.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Fetch transactions from the upstream provider.
    ///
    /// The adapter performs at most one outbound call. Ordering and
    /// pagination are whatever the upstream returns.
    async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AdapterError>;
}

/// Constructs the adapter for a provider.
///
/// The route handler goes through this seam so that tests can substitute
/// deterministic adapters for the live HTTP clients.
pub trait ProviderRegistry: Send + Sync {
    /// Build the adapter for `provider`, or explain why it cannot be built
    /// (e.g. missing credentials).
    fn adapter(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>, AdapterError>;
}

/// The production registry: a total match over [Provider] that builds each
/// adapter from environment-derived configuration.
pub struct LiveRegistry {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl LiveRegistry {
    /// Create a registry backed by `config`.
    ///
    /// `http` is shared by the adapters that use plain TLS; Teller builds
    /// its own client to attach the mTLS identity.
    pub fn new(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

impl ProviderRegistry for LiveRegistry {
    fn adapter(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>, AdapterError> {
        match provider {
            Provider::Plaid => {
                let config = self.config.plaid.clone().ok_or(AdapterError::NotConfigured {
                    provider: Provider::Plaid,
                    variables: "PLAID_CLIENT_ID and PLAID_SECRET",
                })?;

                Ok(Arc::new(PlaidAdapter::new(config, self.http.clone())))
            }
            Provider::Teller => {
                let config = self.config.teller.clone().ok_or(AdapterError::NotConfigured {
                    provider: Provider::Teller,
                    variables: "TELLER_TOKEN, TELLER_CERT_PATH and TELLER_KEY_PATH",
                })?;

                Ok(Arc::new(TellerAdapter::new(config)?))
            }
            Provider::GoCardless => {
                let config = self
                    .config
                    .gocardless
                    .clone()
                    .ok_or(AdapterError::NotConfigured {
                        provider: Provider::GoCardless,
                        variables: "GOCARDLESS_ACCESS_TOKEN",
                    })?;

                Ok(Arc::new(GoCardlessAdapter::new(config, self.http.clone())))
            }
        }
    }
}


#[cfg(test)]
mod live_registry_tests {
    use super::{AdapterError, LiveRegistry, Provider, ProviderRegistry};
    use crate::config::{PlaidConfig, ProviderConfig};

    #[test]
    fn unconfigured_provider_fails_closed() {
        let registry = LiveRegistry::new(ProviderConfig::default(), reqwest::Client::new());

        let result = registry.adapter(Provider::Plaid);

        assert!(matches!(
            result.err(),
            Some(AdapterError::NotConfigured {
                provider: Provider::Plaid,
                ..
            })
        ));
    }

    #[test]
    fn configured_provider_builds_an_adapter() {
        let config = ProviderConfig {
            plaid: Some(PlaidConfig {
                client_id: "client".to_string(),
                secret: "secret".to_string(),
                base_url: "https://sandbox.plaid.com".to_string(),
            }),
            ..Default::default()
        };
        let registry = LiveRegistry::new(config, reqwest::Client::new());

        assert!(registry.adapter(Provider::Plaid).is_ok());
    }

    #[test]
    fn teller_without_certificate_reports_certificate_error() {
        let config = ProviderConfig {
            teller: Some(crate::config::TellerConfig {
                token: "token".to_string(),
                cert_path: "/nonexistent/cert.pem".into(),
                key_path: "/nonexistent/key.pem".into(),
                base_url: "https://api.teller.io".to_string(),
            }),
            ..Default::default()
        };
        let registry = LiveRegistry::new(config, reqwest::Client::new());

        let result = registry.adapter(Provider::Teller);

        assert!(matches!(
            result.err(),
            Some(AdapterError::Certificate(Provider::Teller, _))
        ));
    }
}
