//! The API endpoint URIs.

/// The route for fetching normalized transactions from an upstream provider.
pub const TRANSACTIONS: &str = "/transactions";
/// The liveness probe.
pub const HEALTH: &str = "/health";
