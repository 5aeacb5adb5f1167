use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::*;
use oms_engine::{csv_ingest::DEFAULT_BATCH_SIZE, IngestConfig, InventoryConfig};

const DEFAULT_OMS_HOST: &str = "127.0.0.1";
const DEFAULT_OMS_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/oms.db";
const DEFAULT_OBJECT_STORE_ROOT: &str = "data/objects";
const DEFAULT_STAGING_DIR: &str = "data/staging";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_UPLOAD_BUCKET: &str = "uploads";
const DEFAULT_UPLOAD_KEY: &str = "orders.csv";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 120;
const DEFAULT_QUEUE_WORKERS: usize = 1;
const DEFAULT_QUEUE_MAX_MESSAGES: usize = 10;
const DEFAULT_QUEUE_VISIBILITY_SECS: u64 = 30;
const DEFAULT_EVENT_PARTITIONS: usize = 4;
const DEFAULT_PUBLISH_RETRIES: usize = 3;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub inventory: InventoryConfig,
    /// The directory under which each object store bucket is a subdirectory.
    pub object_store_root: PathBuf,
    pub staging_dir: PathBuf,
    /// Invalid-rows files are written here and served from `/public`.
    pub public_dir: PathBuf,
    pub public_base_url: String,
    /// Where `/api/v1/csv/filepath` puts the files it uploads.
    pub upload_bucket: String,
    pub upload_key: String,
    pub csv_batch_size: usize,
    pub sweep_interval: Duration,
    pub queue_workers: usize,
    pub queue_max_messages: usize,
    /// How long a received intake message stays hidden before it is redelivered.
    pub queue_visibility: Duration,
    pub event_partitions: usize,
    pub publish_retries: usize,
    pub webhook_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OMS_HOST.to_string(),
            port: DEFAULT_OMS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            inventory: InventoryConfig::default(),
            object_store_root: PathBuf::from(DEFAULT_OBJECT_STORE_ROOT),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            public_base_url: default_public_url(DEFAULT_OMS_HOST, DEFAULT_OMS_PORT),
            upload_bucket: DEFAULT_UPLOAD_BUCKET.to_string(),
            upload_key: DEFAULT_UPLOAD_KEY.to_string(),
            csv_batch_size: DEFAULT_BATCH_SIZE,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            queue_workers: DEFAULT_QUEUE_WORKERS,
            queue_max_messages: DEFAULT_QUEUE_MAX_MESSAGES,
            queue_visibility: Duration::from_secs(DEFAULT_QUEUE_VISIBILITY_SECS),
            event_partitions: DEFAULT_EVENT_PARTITIONS,
            publish_retries: DEFAULT_PUBLISH_RETRIES,
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, public_base_url: default_public_url(host, port), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OMS_HOST").ok().unwrap_or_else(|| DEFAULT_OMS_HOST.into());
        let port = parse_env("OMS_PORT", DEFAULT_OMS_PORT);
        let database_url = env::var("OMS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ OMS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let inventory = InventoryConfig::new_from_env_or_default();
        let object_store_root = string_env("OMS_OBJECT_STORE_ROOT", DEFAULT_OBJECT_STORE_ROOT).into();
        let staging_dir = string_env("OMS_STAGING_DIR", DEFAULT_STAGING_DIR).into();
        let public_dir = string_env("OMS_PUBLIC_DIR", DEFAULT_PUBLIC_DIR).into();
        let public_base_url = string_env("OMS_PUBLIC_BASE_URL", &default_public_url(&host, port));
        let upload_bucket = string_env("OMS_UPLOAD_BUCKET", DEFAULT_UPLOAD_BUCKET);
        let upload_key = string_env("OMS_UPLOAD_KEY", DEFAULT_UPLOAD_KEY);
        let csv_batch_size = positive(parse_env("OMS_CSV_BATCH_SIZE", DEFAULT_BATCH_SIZE), "OMS_CSV_BATCH_SIZE");
        let sweep_interval = Duration::from_secs(parse_env("OMS_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS));
        let queue_workers = positive(parse_env("OMS_QUEUE_WORKERS", DEFAULT_QUEUE_WORKERS), "OMS_QUEUE_WORKERS");
        let queue_max_messages =
            positive(parse_env("OMS_QUEUE_MAX_MESSAGES", DEFAULT_QUEUE_MAX_MESSAGES), "OMS_QUEUE_MAX_MESSAGES");
        let queue_visibility =
            Duration::from_secs(parse_env("OMS_QUEUE_VISIBILITY_SECS", DEFAULT_QUEUE_VISIBILITY_SECS));
        let event_partitions =
            positive(parse_env("OMS_EVENT_PARTITIONS", DEFAULT_EVENT_PARTITIONS), "OMS_EVENT_PARTITIONS");
        let publish_retries = parse_env("OMS_PUBLISH_RETRIES", DEFAULT_PUBLISH_RETRIES);
        let webhook_timeout = Duration::from_secs(parse_env("OMS_WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT_SECS));
        Self {
            host,
            port,
            database_url,
            inventory,
            object_store_root,
            staging_dir,
            public_dir,
            public_base_url,
            upload_bucket,
            upload_key,
            csv_batch_size,
            sweep_interval,
            queue_workers,
            queue_max_messages,
            queue_visibility,
            event_partitions,
            publish_retries,
            webhook_timeout,
        }
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            staging_dir: self.staging_dir.clone(),
            public_dir: self.public_dir.clone(),
            public_base_url: self.public_base_url.clone(),
            batch_size: self.csv_batch_size,
        }
    }
}

fn default_public_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/public")
}

fn string_env(name: &str, default: &str) -> String {
    env::var(name).ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
        info!("🪛️ {name} is not set. Using the default value of {default}.");
        default.to_string()
    })
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

fn positive(value: usize, name: &str) -> usize {
    if value == 0 {
        warn!("🪛️ {name} must be at least 1. Using 1.");
        1
    } else {
        value
    }
}
