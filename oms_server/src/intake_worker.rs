use std::{collections::VecDeque, time::Duration};

use log::*;
use oms_engine::{
    events::EventPublisher,
    intake::{IntakeQueue, MemoryQueue, ObjectStore, QueueDelivery},
    BulkIngestApi,
    Disposition,
    InventoryService,
    OrderManagement,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::server::IngestApi;

const RETRY_DELAY: Duration = Duration::from_secs(1);
const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// Starts an intake queue worker. See [`run_intake_worker`].
pub fn start_intake_worker(
    id: usize,
    queue: MemoryQueue,
    api: IngestApi,
    max_messages: usize,
    visibility: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_intake_worker(id, queue, api, max_messages, visibility, shutdown))
}

/// Consumes the intake queue until `shutdown` is cancelled. Each message references a CSV file, which is ingested
/// before the next message is taken. Messages are only acknowledged once they have been dealt with for good; anything
/// else is redelivered once its visibility timeout expires.
///
/// While a file is being ingested, the visibility of its message, and of every message still waiting in the same
/// batch, is extended every third of `visibility`. Other workers therefore never see a message that is being worked
/// on, however long the file takes.
pub async fn run_intake_worker<S, B, I, E, Q>(
    id: usize,
    queue: Q,
    api: BulkIngestApi<S, B, I, E>,
    max_messages: usize,
    visibility: Duration,
    shutdown: CancellationToken,
) where
    S: ObjectStore,
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
    Q: IntakeQueue,
{
    info!("📥️ Intake worker {id} started");
    loop {
        let received = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            received = queue.receive(max_messages, visibility) => received,
        };
        let mut pending = match received {
            Ok(deliveries) => VecDeque::from(deliveries),
            Err(e) => {
                error!("📥️ Intake worker {id} could not read from the queue. {e}");
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            },
        };
        while let Some(delivery) = pending.pop_front() {
            if delivery.receive_count > 1 {
                info!("📥️ Message {} is being redelivered (attempt {})", delivery.receipt, delivery.receive_count);
            }
            match handle_with_heartbeat(&queue, &api, &delivery, &pending, visibility, &shutdown).await {
                Disposition::Ack => {
                    if let Err(e) = queue.ack(&delivery.receipt).await {
                        warn!("📥️ Could not acknowledge message {}. {e}", delivery.receipt);
                    }
                },
                Disposition::Abandon => debug!("📥️ Message {} left for redelivery", delivery.receipt),
            }
            if shutdown.is_cancelled() {
                break;
            }
        }
    }
    info!("📥️ Intake worker {id} stopped");
}

async fn handle_with_heartbeat<S, B, I, E, Q>(
    queue: &Q,
    api: &BulkIngestApi<S, B, I, E>,
    delivery: &QueueDelivery,
    waiting: &VecDeque<QueueDelivery>,
    visibility: Duration,
    shutdown: &CancellationToken,
) -> Disposition
where
    S: ObjectStore,
    B: OrderManagement,
    I: InventoryService,
    E: EventPublisher,
    Q: IntakeQueue,
{
    let handling = api.handle_delivery(delivery, shutdown);
    tokio::pin!(handling);
    let mut heartbeat = tokio::time::interval((visibility / 3).max(MIN_HEARTBEAT));
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately, and the messages were only just received
    heartbeat.tick().await;
    loop {
        tokio::select! {
            disposition = &mut handling => return disposition,
            _ = heartbeat.tick() => {
                for held in std::iter::once(delivery).chain(waiting.iter()) {
                    if let Err(e) = queue.extend_visibility(&held.receipt, visibility).await {
                        warn!("📥️ Could not extend the visibility of message {}. {e}", held.receipt);
                    }
                }
            },
        }
    }
}
