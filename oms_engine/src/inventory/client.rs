use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use super::{InventoryConfig, InventoryError, InventoryService};
use crate::{db_types::Order, events::TENANT_HEADER};

#[derive(Deserialize)]
struct IdentityResponse {
    is_valid: bool,
}

#[derive(Deserialize)]
struct AvailabilityResponse {
    available: bool,
}

/// A `reqwest` client for the inventory service's REST API.
#[derive(Clone)]
pub struct InventoryClient {
    config: InventoryConfig,
    client: Arc<Client>,
}

impl InventoryClient {
    pub fn new(config: InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let val = HeaderValue::from_str(key.reveal().as_str())
                .map_err(|e| InventoryError::Initialization(e.to_string()))?;
            headers.insert("X-Api-Key", val);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| InventoryError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        tenant_id: &Uuid,
        params: &[(&str, String)],
    ) -> Result<T, InventoryError> {
        let url = self.url(path);
        trace!("📦️ GET {url}");
        let mut req = self.client.get(url).header(TENANT_HEADER, tenant_id.to_string());
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| InventoryError::RequestFailed(e.to_string()))?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| InventoryError::InvalidResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(InventoryError::UnexpectedStatus { status, message })
        }
    }
}

impl InventoryService for InventoryClient {
    async fn validate_identity(&self, tenant_id: &Uuid, hub_id: &Uuid, sku_id: &Uuid) -> Result<bool, InventoryError> {
        let path = format!("/validators/validate_order/{hub_id}/{sku_id}");
        let result = self.get::<IdentityResponse>(&path, tenant_id, &[]).await?;
        debug!("📦️ Hub {hub_id} / SKU {sku_id} identity check: {}", result.is_valid);
        Ok(result.is_valid)
    }

    async fn check_availability(&self, order: &Order) -> Result<bool, InventoryError> {
        let path = format!("/inventory/availability/{}/{}", order.hub_id, order.sku_id);
        let params = [("quantity", order.quantity.to_string())];
        let result = self.get::<AvailabilityResponse>(&path, &order.tenant_id, &params).await?;
        debug!("📦️ Order [{}] availability check: {}", order.order_id, result.available);
        Ok(result.available)
    }
}
