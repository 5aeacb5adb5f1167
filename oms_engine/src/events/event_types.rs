use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};

use super::EventLogError;
use crate::db_types::Order;

pub const ORDER_CREATED_TOPIC: &str = "order.created";
pub const TENANT_HEADER: &str = "X-Tenant-ID";
pub const SOURCE_HEADER: &str = "source";

/// Where an order entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    BulkIntake,
    OrderApi,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::BulkIntake => "bulk-intake",
            EventSource::OrderApi => "order-api",
        }
    }
}

impl Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message on the event log. The payload is the JSON-serialized [`Order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl LifecycleEvent {
    pub fn order_created(order: &Order, source: EventSource) -> Result<Self, EventLogError> {
        let payload = serde_json::to_vec(order).map_err(|e| EventLogError::EncodingError(e.to_string()))?;
        let mut headers = HashMap::with_capacity(2);
        headers.insert(TENANT_HEADER.to_string(), order.tenant_id.to_string());
        headers.insert(SOURCE_HEADER.to_string(), source.to_string());
        Ok(Self { topic: ORDER_CREATED_TOPIC.to_string(), key: order_key(order), payload, headers })
    }

    pub fn order(&self) -> Result<Order, EventLogError> {
        serde_json::from_slice(&self.payload).map_err(|e| EventLogError::DecodingError(e.to_string()))
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.headers.get(TENANT_HEADER).map(|s| s.as_str())
    }

    pub fn source(&self) -> Option<&str> {
        self.headers.get(SOURCE_HEADER).map(|s| s.as_str())
    }
}

/// The partition key for an order's events.
pub fn order_key(order: &Order) -> String {
    format!("order-{}", order.order_id)
}
