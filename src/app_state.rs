//! Implements a struct that holds the state of the gateway server.

use std::sync::Arc;

use crate::{
    config::ProviderConfig,
    providers::{LiveRegistry, OUTBOUND_TIMEOUT, ProviderRegistry},
};

/// The state of the gateway server.
///
/// The only thing requests share is the provider registry, which is
/// read-only. Everything else is per-request.
#[derive(Clone)]
pub struct AppState {
    /// Builds the provider adapter for each request.
    pub registry: Arc<dyn ProviderRegistry>,
}

impl AppState {
    /// Create an [AppState] whose registry dispatches to the live provider
    /// APIs using `config` for credentials and endpoints.
    ///
    /// The HTTP connection pool is shared across requests; adapters that
    /// need special transport (Teller's mTLS identity) build their own
    /// client at dispatch time.
    pub fn new(config: ProviderConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(OUTBOUND_TIMEOUT)
            .build()
            // Only fails if the TLS backend cannot initialize.
            .expect("could not create the outbound HTTP client");

        Self {
            registry: Arc::new(LiveRegistry::new(config, http)),
        }
    }

    /// Create an [AppState] with a custom registry. Used by tests to
    /// substitute deterministic adapters for the live HTTP clients.
    pub fn with_registry(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self { registry }
    }
}
