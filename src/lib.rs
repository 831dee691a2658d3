//! Bankfeed is a gateway service that fetches financial transactions from
//! upstream bank-data providers and normalizes them into a single shared
//! shape.
//!
//! A request names a provider (`GET /transactions?provider=teller&...`);
//! the gateway dispatches to that provider's adapter, passes the remaining
//! query parameters through untouched, and returns either the normalized
//! transactions or a deliberately generic error payload.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod config;
pub mod endpoints;
pub mod models;
pub mod providers;
mod routing;
mod transactions;

pub use app_state::AppState;
pub use config::ProviderConfig;
pub use routing::build_router;

use crate::{models::ErrorEnvelope, providers::AdapterError};

/// The one message clients ever see when a request fails.
///
/// The classified cause goes to the server logs; nothing about it is leaked
/// to the caller.
pub const GENERIC_ERROR_MESSAGE: &str = "Oops! Something went wrong.";

/// The errors that may occur while serving a transactions request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The request did not include the `provider` query parameter.
    #[error("the \"provider\" query parameter is required")]
    MissingProvider,

    /// Selecting, constructing, or calling the provider adapter failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log the real cause, then collapse every failure into the same
        // client-facing shape.
        match &self {
            Error::MissingProvider | Error::Adapter(AdapterError::UnknownProvider(_)) => {
                tracing::warn!("rejected transactions request: {}", self);
            }
            Error::Adapter(cause) => {
                tracing::error!("transactions request failed: {}", cause);
            }
        }

        (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope {
                message: GENERIC_ERROR_MESSAGE.to_string(),
            }),
        )
            .into_response()
    }
}

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
