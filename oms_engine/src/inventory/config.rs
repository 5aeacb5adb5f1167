use std::time::Duration;

use log::*;
use oms_common::Secret;

const DEFAULT_INVENTORY_URL: &str = "http://localhost:8081";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INVENTORY_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl InventoryConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("OMS_INVENTORY_URL").unwrap_or_else(|_| {
            warn!("🪛️ OMS_INVENTORY_URL not set, using {DEFAULT_INVENTORY_URL} as default");
            DEFAULT_INVENTORY_URL.to_string()
        });
        let api_key = std::env::var("OMS_INVENTORY_API_KEY").ok().filter(|s| !s.is_empty()).map(Secret::new);
        if api_key.is_none() {
            info!("🪛️ OMS_INVENTORY_API_KEY not set. Inventory requests will not be authenticated");
        }
        let timeout = std::env::var("OMS_INVENTORY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid OMS_INVENTORY_TIMEOUT_SECS ({s}). {e}. Using the default"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { base_url: base_url.trim_end_matches('/').to_string(), api_key, timeout }
    }
}
