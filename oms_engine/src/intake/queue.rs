//! The durable hand-off between the bulk intake endpoint and the file ingestion workers.
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

use super::ObjectPath;

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("Could not encode the queue message. {0}")]
    EncodingError(String),
    #[error("Unknown receipt handle {0}")]
    UnknownReceipt(String),
    #[error("The queue is unavailable. {0}")]
    Unavailable(String),
}

/// Points the ingestion workers at an uploaded file. On the wire this is `{"bucket": "..", "key": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIntakeMessage {
    pub bucket: String,
    pub key: String,
}

impl BulkIntakeMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, QueueError> {
        serde_json::to_vec(self).map_err(|e| QueueError::EncodingError(e.to_string()))
    }

    pub fn from_bytes(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn object_path(&self) -> ObjectPath {
        ObjectPath::new(self.bucket.as_str(), self.key.as_str())
    }
}

impl From<ObjectPath> for BulkIntakeMessage {
    fn from(path: ObjectPath) -> Self {
        Self { bucket: path.bucket, key: path.key }
    }
}

/// A received message. It stays invisible to other receivers until the visibility timeout passes, after which it is
/// delivered again unless it has been acknowledged.
#[derive(Debug, Clone)]
pub struct QueueDelivery {
    pub receipt: String,
    pub body: Vec<u8>,
    pub receive_count: u32,
}

#[allow(async_fn_in_trait)]
pub trait IntakeQueue: Clone {
    async fn send(&self, body: Vec<u8>) -> Result<(), QueueError>;

    /// Waits briefly for up to `max_messages` messages. May return an empty list.
    async fn receive(&self, max_messages: usize, visibility: Duration) -> Result<Vec<QueueDelivery>, QueueError>;

    /// Removes a received message from the queue for good.
    async fn ack(&self, receipt: &str) -> Result<(), QueueError>;

    /// Keeps a received message hidden for another `visibility`, counted from now. Fails with `UnknownReceipt` if the
    /// message was acknowledged or has already been handed to another receiver.
    async fn extend_visibility(&self, receipt: &str, visibility: Duration) -> Result<(), QueueError>;
}

struct StoredMessage {
    body: Vec<u8>,
    receive_count: u32,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    in_flight: HashMap<String, (StoredMessage, Instant)>,
}

impl QueueState {
    fn requeue_expired(&mut self, now: Instant) {
        let expired = self
            .in_flight
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect::<Vec<_>>();
        for receipt in expired {
            if let Some((msg, _)) = self.in_flight.remove(&receipt) {
                trace!("📥️ Message {receipt} was not acknowledged in time. Redelivering");
                self.ready.push_back(msg);
            }
        }
    }

    fn take(&mut self, max_messages: usize, visibility: Duration, now: Instant) -> Vec<QueueDelivery> {
        self.requeue_expired(now);
        let mut result = Vec::new();
        while result.len() < max_messages {
            let Some(mut msg) = self.ready.pop_front() else { break };
            msg.receive_count += 1;
            let receipt = Uuid::new_v4().to_string();
            result.push(QueueDelivery { receipt: receipt.clone(), body: msg.body.clone(), receive_count: msg.receive_count });
            self.in_flight.insert(receipt, (msg, now + visibility));
        }
        result
    }
}

/// An in-process, at-least-once queue with visibility timeouts.
#[derive(Clone)]
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
    wait_time: Duration,
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl MemoryQueue {
    /// `wait_time` is how long an empty `receive` waits for a message before returning.
    pub fn new(wait_time: Duration) -> Self {
        Self { state: Arc::new(Mutex::new(QueueState::default())), notify: Arc::new(Notify::new()), wait_time }
    }

    /// Messages waiting to be received plus messages received but not yet acknowledged.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.ready.len() + s.in_flight.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, QueueState>, QueueError> {
        self.state.lock().map_err(|e| QueueError::Unavailable(e.to_string()))
    }
}

impl IntakeQueue for MemoryQueue {
    async fn send(&self, body: Vec<u8>) -> Result<(), QueueError> {
        self.lock()?.ready.push_back(StoredMessage { body, receive_count: 0 });
        self.notify.notify_one();
        Ok(())
    }

    async fn receive(&self, max_messages: usize, visibility: Duration) -> Result<Vec<QueueDelivery>, QueueError> {
        let batch = self.lock()?.take(max_messages, visibility, Instant::now());
        if !batch.is_empty() {
            return Ok(batch);
        }
        let _ = tokio::time::timeout(self.wait_time, self.notify.notified()).await;
        let batch = self.lock()?.take(max_messages, visibility, Instant::now());
        Ok(batch)
    }

    async fn ack(&self, receipt: &str) -> Result<(), QueueError> {
        match self.lock()?.in_flight.remove(receipt) {
            Some(_) => Ok(()),
            None => Err(QueueError::UnknownReceipt(receipt.to_string())),
        }
    }

    async fn extend_visibility(&self, receipt: &str, visibility: Duration) -> Result<(), QueueError> {
        match self.lock()?.in_flight.get_mut(receipt) {
            Some((_, deadline)) => {
                *deadline = Instant::now() + visibility;
                Ok(())
            },
            None => Err(QueueError::UnknownReceipt(receipt.to_string())),
        }
    }
}
