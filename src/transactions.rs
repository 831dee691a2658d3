//! The route handler for fetching normalized transactions from an upstream
//! provider.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState, Error,
    models::{TransactionQuery, TransactionsResponse},
    providers::Provider,
};

/// A route handler for `GET /transactions`.
///
/// The query string must contain a `provider` key naming one of the
/// supported upstream sources. Every other key is passed through to the
/// selected adapter untouched.
///
/// Responds with `200 { "data": [...] }` on success. Every failure, from a
/// missing `provider` key to an upstream outage, responds with the same
/// generic `400 { "message": ... }` payload; the classified cause is logged
/// but never sent to the caller.
pub async fn get_transactions_endpoint(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TransactionsResponse>, Error> {
    let mut filters = params;
    let provider = filters.remove("provider").ok_or(Error::MissingProvider)?;
    let provider: Provider = provider.parse()?;

    let adapter = state.registry.adapter(provider)?;
    let query = TransactionQuery { provider, filters };

    let data = adapter.get_transactions(&query).await?;
    tracing::debug!(
        "fetched {} transactions from {}",
        data.len(),
        query.provider
    );

    Ok(Json(TransactionsResponse { data }))
}
