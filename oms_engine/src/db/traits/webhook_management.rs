use uuid::Uuid;

use super::StoreError;
use crate::db_types::WebhookRegistration;

/// Persistent storage for the webhook URL that each tenant wants to be notified on.
#[allow(async_fn_in_trait)]
pub trait WebhookManagement: Clone {
    /// Creates or replaces the registration for the tenant. A tenant has at most one registration.
    async fn upsert_webhook(&self, tenant_id: &Uuid, url: &str) -> Result<WebhookRegistration, StoreError>;

    async fn fetch_webhook(&self, tenant_id: &Uuid) -> Result<Option<WebhookRegistration>, StoreError>;
}
