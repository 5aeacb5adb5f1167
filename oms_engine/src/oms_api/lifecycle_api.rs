use std::fmt::Debug;

use log::*;
use uuid::Uuid;

use super::{errors::LifecycleError, webhook_api::WebhookApi, NotifyOutcome};
use crate::{
    db::traits::{OrderManagement, StoreError, WebhookManagement},
    db_types::{Order, OrderStatusType},
    events::LifecycleEvent,
    inventory::InventoryService,
    webhooks::{WebhookCache, WebhookDelivery},
};

/// The result of re-checking one `on_hold` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecheckOutcome {
    /// Stock was confirmed and the order moved to `new_order`.
    Confirmed(Order),
    /// Stock is not available yet. The order stays `on_hold`.
    StillOnHold(Order),
    /// The order was no longer `on_hold` (or no longer exists), so nothing was written.
    AlreadyTransitioned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub confirmed: usize,
    pub still_on_hold: usize,
    pub failed: usize,
}

/// Drives orders from `on_hold` to `new_order` once the inventory service confirms availability. Used by both the
/// event log consumer and the periodic retry sweep.
#[derive(Clone)]
pub struct LifecycleApi<B, I, C, D> {
    db: B,
    inventory: I,
    webhooks: WebhookApi<B, C, D>,
}

impl<B, I, C, D> Debug for LifecycleApi<B, I, C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LifecycleApi")
    }
}

impl<B, I, C, D> LifecycleApi<B, I, C, D> {
    pub fn new(db: B, inventory: I, webhooks: WebhookApi<B, C, D>) -> Self {
        Self { db, inventory, webhooks }
    }
}

impl<B, I, C, D> LifecycleApi<B, I, C, D>
where
    B: OrderManagement + WebhookManagement,
    I: InventoryService,
    C: WebhookCache,
    D: WebhookDelivery,
{
    /// Asks the inventory service about the order and applies the resulting status.
    ///
    /// The update is conditional on the order still being `on_hold`, so replays and races with the sweep are
    /// harmless.
    pub async fn recheck_order(&self, order: &Order) -> Result<RecheckOutcome, LifecycleError> {
        let available = self.inventory.check_availability(order).await?;
        let next = if available { OrderStatusType::NewOrder } else { OrderStatusType::OnHold };
        let updated = self.db.transition_status(&order.order_id, OrderStatusType::OnHold, next).await?;
        let outcome = match (updated, available) {
            (Some(o), true) => {
                info!("🔁️ Order [{}] confirmed by inventory. Status is now {}", o.order_id, o.status);
                RecheckOutcome::Confirmed(o)
            },
            (Some(o), false) => {
                debug!("🔁️ Order [{}] is still waiting for stock", o.order_id);
                RecheckOutcome::StillOnHold(o)
            },
            (None, _) => {
                debug!("🔁️ Order [{}] is no longer on hold. No update made", order.order_id);
                RecheckOutcome::AlreadyTransitioned
            },
        };
        Ok(outcome)
    }

    /// Handles one `order.created` event: decode, re-check inventory, update the status and notify the tenant.
    ///
    /// Events that cannot be decoded are dropped. The tenant is taken from the event metadata. If it is missing, no
    /// notification is sent.
    pub async fn handle_event(&self, event: &LifecycleEvent) -> Result<RecheckOutcome, LifecycleError> {
        let order = event.order().map_err(|e| {
            warn!("🔁️ Dropping undecodable event {}. {e}", event.key);
            e
        })?;
        let outcome = self.recheck_order(&order).await?;
        let tenant = event.tenant_id().and_then(|t| {
            Uuid::parse_str(t).map_err(|e| warn!("🔁️ Event {} has an invalid tenant header '{t}'. {e}", event.key)).ok()
        });
        let Some(tenant_id) = tenant else {
            info!("🔁️ Event {} carries no tenant. Skipping the webhook", event.key);
            return Ok(outcome);
        };
        let payload = match &outcome {
            RecheckOutcome::Confirmed(updated) | RecheckOutcome::StillOnHold(updated) => updated.clone(),
            RecheckOutcome::AlreadyTransitioned => self.db.fetch_order(&order.order_id).await?.unwrap_or(order),
        };
        match self.webhooks.notify(&tenant_id, &payload).await {
            Ok(NotifyOutcome::Delivered) => trace!("🔁️ Tenant {tenant_id} notified about [{}]", payload.order_id),
            Ok(_) => {},
            Err(e) => warn!("🔁️ Could not notify tenant {tenant_id} about [{}]. {e}", payload.order_id),
        }
        Ok(outcome)
    }

    /// Re-checks every `on_hold` order. A failure on one order is logged and does not stop the sweep. No webhooks are
    /// sent from here.
    pub async fn sweep_on_hold(&self) -> Result<SweepReport, StoreError> {
        let orders = self.db.fetch_orders_with_status(OrderStatusType::OnHold).await?;
        let mut report = SweepReport { checked: orders.len(), ..Default::default() };
        for order in &orders {
            match self.recheck_order(order).await {
                Ok(RecheckOutcome::Confirmed(_)) => report.confirmed += 1,
                Ok(RecheckOutcome::StillOnHold(_)) => report.still_on_hold += 1,
                Ok(RecheckOutcome::AlreadyTransitioned) => {},
                Err(e) => {
                    warn!("🔁️ Re-check of order [{}] failed. {e}", order.order_id);
                    report.failed += 1;
                },
            }
        }
        Ok(report)
    }
}
