//! Order lifecycle events.
//!
//! Every order that is stored is announced on the event log as an `order.created` event. The lifecycle consumer
//! subscribes to the log and asks the inventory service whether the order can be fulfilled.
//!
//! The [`EventPublisher`] trait is the producer side of the log. [`ChannelEventLog`] is an in-process implementation
//! that preserves per-key ordering by hashing the event key onto a fixed set of partitions.
mod channel;
mod event_types;

pub use channel::{channel_event_log, ChannelEventLog, EventLogSubscription, Handler};
pub use event_types::*;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EventLogError {
    #[error("The event log is closed")]
    Closed,
    #[error("Could not encode the event payload. {0}")]
    EncodingError(String),
    #[error("Could not decode the event payload. {0}")]
    DecodingError(String),
}

/// The producer side of the event log.
#[allow(async_fn_in_trait)]
pub trait EventPublisher: Clone {
    /// Appends the event to the log. Events with the same key are delivered to consumers in the order they were
    /// published.
    async fn publish(&self, event: LifecycleEvent) -> Result<(), EventLogError>;
}
