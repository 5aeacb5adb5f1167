//! Hand-written collaborators for tests that exercise the real pipeline end to end.
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use dashmap::{DashMap, DashSet};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db_types::{Order, OrderId},
    inventory::{InventoryError, InventoryService},
    webhooks::{DeliveryError, WebhookDelivery},
};

/// An inventory service whose answers are set by the test.
///
/// Every hub/SKU pair is valid unless it has been marked invalid. Availability defaults to `default_available`, and
/// can be overridden per order.
#[derive(Clone, Default)]
pub struct StubInventory {
    invalid_skus: Arc<DashSet<Uuid>>,
    available: Arc<DashMap<OrderId, bool>>,
    default_available: Arc<AtomicBool>,
    unavailable_service: Arc<AtomicBool>,
    identity_calls: Arc<AtomicUsize>,
    availability_calls: Arc<AtomicUsize>,
    identity_latency_ms: Arc<AtomicU64>,
}

impl StubInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_sku_invalid(&self, sku_id: Uuid) {
        self.invalid_skus.insert(sku_id);
    }

    pub fn set_available(&self, order_id: OrderId, available: bool) {
        self.available.insert(order_id, available);
    }

    pub fn set_default_available(&self, available: bool) {
        self.default_available.store(available, Ordering::SeqCst);
    }

    /// While set, every availability call fails.
    pub fn set_service_down(&self, down: bool) {
        self.unavailable_service.store(down, Ordering::SeqCst);
    }

    /// Makes every identity check take at least `latency`, which slows down ingestion by that much per row.
    pub fn set_identity_latency(&self, latency: Duration) {
        self.identity_latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn availability_calls(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }
}

impl InventoryService for StubInventory {
    async fn validate_identity(&self, _tenant_id: &Uuid, _hub_id: &Uuid, sku_id: &Uuid) -> Result<bool, InventoryError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.identity_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        Ok(!self.invalid_skus.contains(sku_id))
    }

    async fn check_availability(&self, order: &Order) -> Result<bool, InventoryError> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable_service.load(Ordering::SeqCst) {
            return Err(InventoryError::RequestFailed("The stub inventory service is down".to_string()));
        }
        let default = self.default_available.load(Ordering::SeqCst);
        Ok(self.available.get(&order.order_id).map(|v| *v.value()).unwrap_or(default))
    }
}

/// Records every webhook it is asked to deliver.
#[derive(Clone, Default)]
pub struct RecordingDelivery {
    posts: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl WebhookDelivery for RecordingDelivery {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError> {
        let mut posts = self.posts.lock().map_err(|e| DeliveryError::RequestFailed(e.to_string()))?;
        posts.push((url.to_string(), body.clone()));
        Ok(())
    }
}
