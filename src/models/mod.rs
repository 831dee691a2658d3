//! This module defines the domain data types shared between the gateway
//! route and the provider adapters.

mod transaction;

pub use transaction::{
    ErrorEnvelope, Transaction, TransactionQuery, TransactionStatus, TransactionsResponse,
};
