use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use futures::future::join_all;
use log::*;
use oms_engine::{
    events::{channel_event_log, ChannelEventLog},
    intake::{BulkIntakePublisher, LocalObjectStore, MemoryQueue, ObjectPath},
    webhooks::{HttpWebhookDelivery, MemoryWebhookCache},
    BulkIngestApi,
    InventoryClient,
    LifecycleApi,
    OrderFlowApi,
    SqliteDatabase,
    WebhookApi,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    intake_worker::start_intake_worker,
    lifecycle_worker::start_lifecycle_worker,
    routes::{
        health,
        BulkOrderRoute,
        CreateOrderRoute,
        PublicDir,
        PublicFileRoute,
        RegisterWebhookRoute,
        SearchOrdersRoute,
        UploadCsvRoute,
        UploadTarget,
    },
    sweep_worker::start_sweep_worker,
};

const EVENT_BUFFER_SIZE: usize = 256;
const QUEUE_WAIT_TIME: Duration = Duration::from_secs(1);

pub type OrdersApi = OrderFlowApi<SqliteDatabase, InventoryClient, ChannelEventLog>;
pub type IngestApi = BulkIngestApi<LocalObjectStore, SqliteDatabase, InventoryClient, ChannelEventLog>;
pub type IntakePublisher = BulkIntakePublisher<LocalObjectStore, MemoryQueue>;
pub type TenantWebhookApi = WebhookApi<SqliteDatabase, MemoryWebhookCache, HttpWebhookDelivery>;
pub type OrderLifecycleApi = LifecycleApi<SqliteDatabase, InventoryClient, MemoryWebhookCache, HttpWebhookDelivery>;

/// The APIs that the HTTP handlers are given.
#[derive(Clone)]
pub struct ServerApis {
    pub orders: OrdersApi,
    pub publisher: IntakePublisher,
    pub webhooks: TenantWebhookApi,
}

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let init = |e: String| ServerError::InitializeError(e);
    let db = SqliteDatabase::new_with_url(&config.database_url, 25).await.map_err(|e| init(e.to_string()))?;
    db.migrate().await.map_err(|e| init(e.to_string()))?;
    let inventory = InventoryClient::new(config.inventory.clone()).map_err(|e| init(e.to_string()))?;
    let delivery = HttpWebhookDelivery::new(config.webhook_timeout).map_err(|e| init(e.to_string()))?;
    let store = LocalObjectStore::new(&config.object_store_root);
    let queue = MemoryQueue::new(QUEUE_WAIT_TIME);
    let (events, subscription) = channel_event_log(config.event_partitions, EVENT_BUFFER_SIZE);

    let orders = OrderFlowApi::new(db.clone(), inventory.clone(), events).with_publish_retries(config.publish_retries);
    let webhooks = WebhookApi::new(db.clone(), MemoryWebhookCache::new(), delivery);
    let lifecycle = LifecycleApi::new(db.clone(), inventory, webhooks.clone());
    let ingest = BulkIngestApi::new(store.clone(), orders.clone(), config.ingest_config());
    let publisher = BulkIntakePublisher::new(store, queue.clone());

    let shutdown = CancellationToken::new();
    let mut workers = vec![
        start_lifecycle_worker(subscription, lifecycle.clone(), shutdown.clone()),
        start_sweep_worker(lifecycle, config.sweep_interval, shutdown.clone()),
    ];
    for id in 0..config.queue_workers {
        workers.push(start_intake_worker(
            id,
            queue.clone(),
            ingest.clone(),
            config.queue_max_messages,
            config.queue_visibility,
            shutdown.clone(),
        ));
    }

    let apis = ServerApis { orders, publisher, webhooks };
    let srv = create_server_instance(config, apis)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ HTTP server has stopped. Shutting down the workers");
    shutdown.cancel();
    for worker in join_all(workers).await {
        if let Err(e) = worker {
            warn!("🚀️ A worker did not shut down cleanly. {e}");
        }
    }
    result
}

pub fn create_server_instance(config: ServerConfig, apis: ServerApis) -> Result<Server, ServerError> {
    let upload_target = UploadTarget(ObjectPath::new(config.upload_bucket.as_str(), config.upload_key.as_str()));
    let public_dir = PublicDir(config.public_dir.clone());
    let srv = HttpServer::new(move || {
        let api_scope = web::scope("/api/v1")
            .service(CreateOrderRoute::<SqliteDatabase, InventoryClient, ChannelEventLog>::new())
            .service(SearchOrdersRoute::<SqliteDatabase, InventoryClient, ChannelEventLog>::new())
            .service(BulkOrderRoute::<LocalObjectStore, MemoryQueue>::new())
            .service(UploadCsvRoute::<LocalObjectStore, MemoryQueue>::new())
            .service(RegisterWebhookRoute::<SqliteDatabase, MemoryWebhookCache, HttpWebhookDelivery>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("oms::access_log"))
            .app_data(web::Data::new(apis.orders.clone()))
            .app_data(web::Data::new(apis.publisher.clone()))
            .app_data(web::Data::new(apis.webhooks.clone()))
            .app_data(web::Data::new(upload_target.clone()))
            .app_data(web::Data::new(public_dir.clone()))
            .service(health)
            .service(PublicFileRoute::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
