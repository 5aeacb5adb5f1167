use log::*;

use super::errors::OrderValidationError;
use crate::{db_types::NewOrder, inventory::InventoryService};

/// Checks that do not need the outside world. The first failure wins, in this order: the four order identifiers,
/// the tenant, the quantity, the price.
pub fn check_structure(order: &NewOrder) -> Result<(), OrderValidationError> {
    if order.order_id.is_nil() {
        return Err(OrderValidationError::MissingOrderId);
    }
    if order.sku_id.is_nil() {
        return Err(OrderValidationError::MissingSkuId);
    }
    if order.hub_id.is_nil() {
        return Err(OrderValidationError::MissingHubId);
    }
    if order.seller_id.is_nil() {
        return Err(OrderValidationError::MissingSellerId);
    }
    if order.tenant_id.is_nil() {
        return Err(OrderValidationError::MissingTenantId);
    }
    if order.quantity <= 0 {
        return Err(OrderValidationError::NonPositiveQuantity(order.quantity));
    }
    if order.price.is_negative() {
        return Err(OrderValidationError::NegativePrice(order.price));
    }
    Ok(())
}

#[derive(Clone)]
pub struct OrderValidator<I> {
    inventory: I,
}

impl<I> OrderValidator<I> {
    pub fn new(inventory: I) -> Self {
        Self { inventory }
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }
}

impl<I: InventoryService> OrderValidator<I> {
    /// Runs the structural checks and then asks the inventory service to confirm the SKU and hub.
    ///
    /// The inventory service is only called if the structural checks pass. Any failure to get a clear answer from it
    /// rejects the order.
    pub async fn validate(&self, order: &NewOrder) -> Result<(), OrderValidationError> {
        check_structure(order)?;
        match self.inventory.validate_identity(&order.tenant_id, &order.hub_id, &order.sku_id).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!("🔄️📦️ Order [{}] rejected. SKU {} is not valid for hub {}", order.order_id, order.sku_id, order.hub_id);
                Err(OrderValidationError::UnknownSkuOrHub { hub_id: order.hub_id, sku_id: order.sku_id })
            },
            Err(e) => {
                warn!("🔄️📦️ Order [{}] rejected. The identity check failed. {e}", order.order_id);
                Err(OrderValidationError::IdentityCheckFailed(e.to_string()))
            },
        }
    }
}
