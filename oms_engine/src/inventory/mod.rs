//! The external inventory service.
//!
//! The service answers two separate questions, and the engine never confuses them:
//! * identity: do this hub and SKU exist and belong together? Asked once, before an order is stored.
//! * availability: can this hub fulfil this quantity right now? Asked whenever an `on_hold` order is re-checked.
mod client;
mod config;

pub use client::InventoryClient;
pub use config::InventoryConfig;
use thiserror::Error;
use uuid::Uuid;

use crate::db_types::Order;

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Could not initialise the inventory client. {0}")]
    Initialization(String),
    #[error("Inventory request failed. {0}")]
    RequestFailed(String),
    #[error("Inventory service returned status {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Could not decode the inventory response. {0}")]
    InvalidResponse(String),
}

#[allow(async_fn_in_trait)]
pub trait InventoryService: Clone {
    /// Asks whether the hub and SKU are known, and valid for the tenant.
    async fn validate_identity(&self, tenant_id: &Uuid, hub_id: &Uuid, sku_id: &Uuid) -> Result<bool, InventoryError>;

    /// Asks whether the order's hub currently has enough stock of the SKU.
    async fn check_availability(&self, order: &Order) -> Result<bool, InventoryError>;
}
