//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{AppState, endpoints, transactions::get_transactions_endpoint};

/// Return a router with all the gateway's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::HEALTH, get(get_health))
        .fallback(get_not_found)
        .with_state(state)
}

/// The liveness probe: always 200 while the process is serving.
async fn get_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

async fn get_not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod routing_tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use serde_json::Value;

    use crate::{
        AppState, build_router, endpoints,
        providers::{AdapterError, Provider, ProviderAdapter, ProviderRegistry},
    };

    struct EmptyRegistry;

    impl ProviderRegistry for EmptyRegistry {
        fn adapter(&self, provider: Provider) -> Result<Arc<dyn ProviderAdapter>, AdapterError> {
            Err(AdapterError::NotConfigured {
                provider,
                variables: "TEST_CREDENTIALS",
            })
        }
    }

    fn test_server() -> TestServer {
        let state = AppState::with_registry(Arc::new(EmptyRegistry));

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn health_route_reports_ok() {
        let server = test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = test_server();

        let response = server.get("/no/such/route").await;

        response.assert_status_not_found();
    }
}
