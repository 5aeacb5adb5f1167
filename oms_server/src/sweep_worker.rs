use std::time::Duration;

use log::*;
use oms_engine::{
    webhooks::{WebhookCache, WebhookDelivery},
    InventoryService,
    LifecycleApi,
    OrderManagement,
    WebhookManagement,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::server::OrderLifecycleApi;

/// Starts the retry sweeper. See [`run_sweep_worker`].
pub fn start_sweep_worker(api: OrderLifecycleApi, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run_sweep_worker(api, interval, shutdown))
}

/// Re-checks every order that is still on hold once per `interval`, until `shutdown` is cancelled. The first sweep
/// runs immediately. The sweeper does not notify tenants.
pub async fn run_sweep_worker<B, I, C, D>(
    api: LifecycleApi<B, I, C, D>,
    interval: Duration,
    shutdown: CancellationToken,
) where
    B: OrderManagement + WebhookManagement,
    I: InventoryService,
    C: WebhookCache,
    D: WebhookDelivery,
{
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("🧹️ Retry sweeper started. Running every {}ms", interval.as_millis());
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = timer.tick() => {},
        }
        trace!("🧹️ Running the on-hold sweep");
        let result = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = api.sweep_on_hold() => result,
        };
        match result {
            Ok(report) if report.checked == 0 => trace!("🧹️ No orders are on hold"),
            Ok(report) => info!(
                "🧹️ Sweep complete. {} checked, {} confirmed, {} still on hold, {} failed",
                report.checked, report.confirmed, report.still_on_hold, report.failed
            ),
            Err(e) => error!("🧹️ Error running the on-hold sweep. {e}"),
        }
    }
    info!("🧹️ Retry sweeper stopped");
}
