//! In-process, partitioned event log
//!
//! Events are hashed by key onto one of a fixed number of partitions. Each partition is an mpsc channel that is
//! drained by its own task, so events for the same key are handled strictly in order, while different partitions are
//! handled concurrently.
use std::{
    collections::hash_map::DefaultHasher,
    future::Future,
    hash::{Hash, Hasher},
    pin::Pin,
    sync::Arc,
};

use log::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{EventLogError, EventPublisher, LifecycleEvent};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Creates an event log with `partitions` partitions, each buffering up to `buffer_size` events.
pub fn channel_event_log(partitions: usize, buffer_size: usize) -> (ChannelEventLog, EventLogSubscription) {
    let partitions = partitions.max(1);
    let (senders, receivers) = (0..partitions).map(|_| mpsc::channel(buffer_size.max(1))).unzip();
    (ChannelEventLog { partitions: Arc::new(senders) }, EventLogSubscription { receivers })
}

#[derive(Clone)]
pub struct ChannelEventLog {
    partitions: Arc<Vec<mpsc::Sender<LifecycleEvent>>>,
}

impl ChannelEventLog {
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn partition_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions.len() as u64) as usize
    }
}

impl EventPublisher for ChannelEventLog {
    async fn publish(&self, event: LifecycleEvent) -> Result<(), EventLogError> {
        let partition = self.partition_for(&event.key);
        trace!("📬️ Publishing {} event {} to partition {partition}", event.topic, event.key);
        self.partitions[partition].send(event).await.map_err(|e| {
            error!("📬️ Failed to send event: {e}");
            EventLogError::Closed
        })
    }
}

pub struct EventLogSubscription {
    receivers: Vec<mpsc::Receiver<LifecycleEvent>>,
}

impl EventLogSubscription {
    /// Consumes events until the token is cancelled, or until every publisher has been dropped.
    ///
    /// Each event is handed to `handler` and awaited before the next event from the same partition is taken. An event
    /// that is already being handled when the token is cancelled runs to completion.
    pub async fn start(self, handler: Handler<LifecycleEvent>, shutdown: CancellationToken) {
        debug!("📬️ Starting event log consumer on {} partitions", self.receivers.len());
        let tasks = self
            .receivers
            .into_iter()
            .enumerate()
            .map(|(partition, mut rx)| {
                let handler = Arc::clone(&handler);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => break,
                            ev = rx.recv() => match ev {
                                Some(ev) => {
                                    trace!("📬️ Handling event {} on partition {partition}", ev.key);
                                    (handler)(ev).await;
                                },
                                None => break,
                            },
                        }
                    }
                    trace!("📬️ Partition {partition} consumer stopped");
                })
            })
            .collect::<Vec<_>>();
        for result in futures_util::future::join_all(tasks).await {
            if let Err(e) = result {
                warn!("📬️ An event log partition consumer failed to shut down cleanly: {e}");
            }
        }
        debug!("📬️ Event log consumer has shut down");
    }
}
