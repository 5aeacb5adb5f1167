use std::fmt::Debug;

use log::*;
use serde::Serialize;
use uuid::Uuid;

use super::errors::WebhookApiError;
use crate::{
    db::traits::WebhookManagement,
    db_types::WebhookRegistration,
    webhooks::{WebhookCache, WebhookDelivery},
};

/// What happened to a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    NoRegistration,
    Failed(String),
}

/// Tenant webhook registration and best-effort delivery.
///
/// Callback URLs are looked up in the cache first and in the store on a miss, after which the cache is populated.
#[derive(Clone)]
pub struct WebhookApi<B, C, D> {
    db: B,
    cache: C,
    delivery: D,
}

impl<B, C, D> Debug for WebhookApi<B, C, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, C, D> WebhookApi<B, C, D> {
    pub fn new(db: B, cache: C, delivery: D) -> Self {
        Self { db, cache, delivery }
    }
}

/// Only absolute http(s) URLs with a host are accepted.
pub fn validate_webhook_url(url: &str) -> Result<(), WebhookApiError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| WebhookApiError::InvalidUrl(format!("{url} ({e})")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(WebhookApiError::InvalidUrl(url.to_string()));
    }
    Ok(())
}

impl<B, C, D> WebhookApi<B, C, D>
where
    B: WebhookManagement,
    C: WebhookCache,
    D: WebhookDelivery,
{
    /// Creates or replaces the tenant's registration and refreshes the cache.
    pub async fn register(&self, tenant_id: &Uuid, url: &str) -> Result<WebhookRegistration, WebhookApiError> {
        if tenant_id.is_nil() {
            return Err(WebhookApiError::MissingTenantId);
        }
        validate_webhook_url(url)?;
        let registration = self.db.upsert_webhook(tenant_id, url).await?;
        if let Err(e) = self.cache.set_url(tenant_id, url).await {
            warn!("🪝️ Webhook for tenant {tenant_id} was saved, but could not be cached. {e}");
        }
        info!("🪝️ Tenant {tenant_id} registered webhook {url}");
        Ok(registration)
    }

    /// Finds the tenant's callback URL, or `None` if the tenant never registered one.
    pub async fn resolve_url(&self, tenant_id: &Uuid) -> Result<Option<String>, WebhookApiError> {
        match self.cache.get_url(tenant_id).await {
            Ok(Some(url)) => return Ok(Some(url)),
            Ok(None) => trace!("🪝️ Webhook cache miss for tenant {tenant_id}"),
            Err(e) => warn!("🪝️ Webhook cache lookup failed for tenant {tenant_id}. {e}. Falling back to the store"),
        }
        let Some(registration) = self.db.fetch_webhook(tenant_id).await? else {
            return Ok(None);
        };
        if let Err(e) = self.cache.set_url(tenant_id, &registration.url).await {
            warn!("🪝️ Could not cache the webhook for tenant {tenant_id}. {e}");
        }
        Ok(Some(registration.url))
    }

    /// POSTs the payload to the tenant's callback URL. Delivery failures are logged and reported in the outcome, but
    /// never retried.
    pub async fn notify<T: Serialize>(&self, tenant_id: &Uuid, payload: &T) -> Result<NotifyOutcome, WebhookApiError> {
        let Some(url) = self.resolve_url(tenant_id).await? else {
            info!("🪝️ Tenant {tenant_id} has no webhook registered. Skipping notification");
            return Ok(NotifyOutcome::NoRegistration);
        };
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                error!("🪝️ Could not serialize the webhook payload for tenant {tenant_id}. {e}");
                return Ok(NotifyOutcome::Failed(e.to_string()));
            },
        };
        match self.delivery.post_json(&url, &body).await {
            Ok(()) => {
                debug!("🪝️ Notified tenant {tenant_id} at {url}");
                Ok(NotifyOutcome::Delivered)
            },
            Err(e) => {
                warn!("🪝️ Webhook delivery to {url} for tenant {tenant_id} failed. {e}");
                Ok(NotifyOutcome::Failed(e.to_string()))
            },
        }
    }
}
