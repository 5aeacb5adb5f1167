use std::{fmt::Debug, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use log::*;

use super::{
    errors::{OrderFlowError, OrderValidationError},
    validator::OrderValidator,
};
use crate::{
    db::traits::{OrderManagement, StoreError},
    db_types::{NewOrder, Order},
    events::{EventLogError, EventPublisher, EventSource, LifecycleEvent},
    inventory::InventoryService,
    order_objects::OrderQueryFilter,
};

pub const DEFAULT_PUBLISH_RETRIES: usize = 3;

/// `OrderFlowApi` takes new orders from either entry path through validation, storage and the `order.created`
/// announcement.
#[derive(Clone)]
pub struct OrderFlowApi<B, I, E> {
    db: B,
    validator: OrderValidator<I>,
    events: E,
    publish_backoff: ExponentialBuilder,
}

impl<B, I, E> Debug for OrderFlowApi<B, I, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, I, E> OrderFlowApi<B, I, E> {
    pub fn new(db: B, inventory: I, events: E) -> Self {
        Self {
            db,
            validator: OrderValidator::new(inventory),
            events,
            publish_backoff: publish_backoff(DEFAULT_PUBLISH_RETRIES),
        }
    }

    /// Sets how many times a failed publish is retried before the error is reported.
    pub fn with_publish_retries(mut self, retries: usize) -> Self {
        self.publish_backoff = publish_backoff(retries);
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn publish_backoff(retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(50))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(retries)
}

impl<B, I, E> OrderFlowApi<B, I, E>
where
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
{
    pub async fn validate(&self, order: &NewOrder) -> Result<(), OrderValidationError> {
        self.validator.validate(order).await
    }

    /// Stores a validated order with status `on_hold`.
    pub async fn persist(&self, order: NewOrder) -> Result<Order, StoreError> {
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order [{}] stored for tenant {}", order.order_id, order.tenant_id);
        Ok(order)
    }

    /// Announces the order on the event log. Failed publishes are retried with exponential backoff before the last
    /// error is returned.
    pub async fn publish_created(&self, order: &Order, source: EventSource) -> Result<(), EventLogError> {
        let event = LifecycleEvent::order_created(order, source)?;
        let event = &event;
        let events = &self.events;
        (|| async move { events.publish(event.clone()).await })
            .retry(self.publish_backoff.clone())
            .notify(|e, delay| warn!("🔄️📦️ Publishing {} failed. {e}. Retrying in {delay:?}", event.key))
            .await?;
        trace!("🔄️📦️ Published order.created for [{}]", order.order_id);
        Ok(())
    }

    /// Validates, stores and announces a new order.
    ///
    /// If the order is stored but cannot be announced, [`OrderFlowError::Publish`] carries the stored order. It stays
    /// `on_hold` and will be picked up by the retry sweep.
    pub async fn process_new_order(&self, order: NewOrder, source: EventSource) -> Result<Order, OrderFlowError> {
        self.validate(&order).await?;
        let order = self.persist(order).await?;
        if let Err(error) = self.publish_created(&order, source).await {
            error!("🔄️📦️ Order [{}] was stored, but could not be announced. {error}", order.order_id);
            return Err(OrderFlowError::Publish { order: Box::new(order), error });
        }
        info!("🔄️📦️ Order [{}] accepted from {source}", order.order_id);
        Ok(order)
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError> {
        trace!("🔄️📦️ Searching orders. {query}");
        self.db.search_orders(query).await
    }
}
