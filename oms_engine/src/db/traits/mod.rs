//! Behaviour that order store backends need to expose in order to be supported by the order management engine.
//!
//! Backends return [`StoreError`] for every failure, so that the APIs built on top of them do not need to carry the
//! backend type around in their own error types.
mod order_management;
mod webhook_management;

pub use order_management::OrderManagement;
use thiserror::Error;
pub use webhook_management::WebhookManagement;

use crate::db_types::OrderId;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An order with id {0} already exists")]
    DuplicateOrder(OrderId),
    #[error("Could not construct the query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::DatabaseError(format!("Migration failed. {e}"))
    }
}
