use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error("Could not initialise the webhook client. {0}")]
    Initialization(String),
    #[error("Webhook request failed. {0}")]
    RequestFailed(String),
    #[error("Webhook endpoint returned status {0}")]
    Rejected(u16),
}

#[allow(async_fn_in_trait)]
pub trait WebhookDelivery: Clone {
    /// POSTs `body` as JSON to `url`. A non-2xx response is an error.
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct HttpWebhookDelivery {
    client: Arc<Client>,
}

impl HttpWebhookDelivery {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| DeliveryError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }
}

impl WebhookDelivery for HttpWebhookDelivery {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError> {
        trace!("🪝️ POST {url}");
        let response =
            self.client.post(url).json(body).send().await.map_err(|e| DeliveryError::RequestFailed(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            debug!("🪝️ Webhook delivered to {url} ({status})");
            Ok(())
        } else {
            Err(DeliveryError::Rejected(status.as_u16()))
        }
    }
}
