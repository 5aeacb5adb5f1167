use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("The cache is unavailable. {0}")]
    Unavailable(String),
}

pub fn webhook_cache_key(tenant_id: &Uuid) -> String {
    format!("webhook:{tenant_id}")
}

/// Memoizes each tenant's webhook URL. Entries never expire. They are replaced when the tenant registers again.
#[allow(async_fn_in_trait)]
pub trait WebhookCache: Clone {
    async fn get_url(&self, tenant_id: &Uuid) -> Result<Option<String>, CacheError>;

    async fn set_url(&self, tenant_id: &Uuid, url: &str) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryWebhookCache {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryWebhookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WebhookCache for MemoryWebhookCache {
    async fn get_url(&self, tenant_id: &Uuid) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(&webhook_cache_key(tenant_id)).map(|v| v.value().clone()))
    }

    async fn set_url(&self, tenant_id: &Uuid, url: &str) -> Result<(), CacheError> {
        self.entries.insert(webhook_cache_key(tenant_id), url.to_string());
        Ok(())
    }
}
