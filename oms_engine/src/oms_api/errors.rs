use thiserror::Error;
use uuid::Uuid;

use crate::{
    csv_ingest::CsvIngestError,
    db::traits::StoreError,
    db_types::{Order, Price},
    events::EventLogError,
    intake::StageError,
    inventory::InventoryError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("The order id is missing")]
    MissingOrderId,
    #[error("The SKU id is missing")]
    MissingSkuId,
    #[error("The hub id is missing")]
    MissingHubId,
    #[error("The seller id is missing")]
    MissingSellerId,
    #[error("The tenant id is missing")]
    MissingTenantId,
    #[error("Quantity must be greater than zero, but was {0}")]
    NonPositiveQuantity(i64),
    #[error("Price cannot be negative, but was {0}")]
    NegativePrice(Price),
    #[error("SKU {sku_id} is not valid for hub {hub_id}")]
    UnknownSkuOrHub { hub_id: Uuid, sku_id: Uuid },
    #[error("Could not confirm the SKU and hub with the inventory service. {0}")]
    IdentityCheckFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid order. {0}")]
    Validation(#[from] OrderValidationError),
    #[error("Could not store the order. {0}")]
    Store(#[from] StoreError),
    /// The order was stored, but the order.created event could not be published.
    #[error("Order {} was stored, but its event could not be published. {error}", order.order_id)]
    Publish { order: Box<Order>, error: EventLogError },
}

#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    #[error("Could not decode the event. {0}")]
    Decode(#[from] EventLogError),
    #[error("Availability check failed. {0}")]
    Inventory(#[from] InventoryError),
    #[error("Could not update the order. {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum WebhookApiError {
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),
    #[error("The tenant id is missing")]
    MissingTenantId,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("Could not stage the file. {0}")]
    Stage(#[from] StageError),
    #[error("Could not ingest the file. {0}")]
    Csv(#[from] CsvIngestError),
}
