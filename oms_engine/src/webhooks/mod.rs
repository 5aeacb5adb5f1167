//! Tenant webhook notification plumbing: the URL cache and the HTTP delivery client.
mod cache;
mod delivery;

pub use cache::{webhook_cache_key, CacheError, MemoryWebhookCache, WebhookCache};
pub use delivery::{DeliveryError, HttpWebhookDelivery, WebhookDelivery};
