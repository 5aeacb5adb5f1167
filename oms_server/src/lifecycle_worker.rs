use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use oms_engine::{
    events::{EventLogSubscription, Handler, LifecycleEvent},
    RecheckOutcome,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::server::OrderLifecycleApi;

/// Starts the lifecycle event consumer. Every `order.created` event triggers an inventory re-check for the order and a
/// notification to its tenant.
pub fn start_lifecycle_worker(
    subscription: EventLogSubscription,
    api: OrderLifecycleApi,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let handler: Handler<LifecycleEvent> = Arc::new(move |event: LifecycleEvent| {
        let api = api.clone();
        Box::pin(async move {
            match api.handle_event(&event).await {
                Ok(RecheckOutcome::Confirmed(order)) => debug!("🔁️ Order [{}] confirmed", order.order_id),
                Ok(RecheckOutcome::StillOnHold(order)) => debug!("🔁️ Order [{}] remains on hold", order.order_id),
                Ok(RecheckOutcome::AlreadyTransitioned) => trace!("🔁️ Event {} needed no update", event.key),
                Err(e) => warn!("🔁️ Could not process event {}. The sweeper will retry the order. {e}", event.key),
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    info!("🔁️ Lifecycle event consumer started");
    tokio::spawn(subscription.start(handler, shutdown))
}
