use std::{
    collections::HashMap,
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use cucumber::World;
use log::*;
use oms_engine::{
    db_types::OrderId,
    events::{channel_event_log, ChannelEventLog, Handler, LifecycleEvent},
    intake::{BulkIntakePublisher, LocalObjectStore, MemoryQueue},
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        stubs::{RecordingDelivery, StubInventory},
    },
    webhooks::MemoryWebhookCache,
    BulkIngestApi,
    IngestConfig,
    IngestReport,
    LifecycleApi,
    OrderFlowApi,
    SqliteDatabase,
    WebhookApi,
};
use tempfile::TempDir;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub type Orders = OrderFlowApi<SqliteDatabase, StubInventory, ChannelEventLog>;
pub type Ingest = BulkIngestApi<LocalObjectStore, SqliteDatabase, StubInventory, ChannelEventLog>;
pub type Webhooks = WebhookApi<SqliteDatabase, MemoryWebhookCache, RecordingDelivery>;
pub type Lifecycle = LifecycleApi<SqliteDatabase, StubInventory, MemoryWebhookCache, RecordingDelivery>;

#[derive(Default, Debug, World)]
pub struct OmsWorld {
    pub system: Option<OrderManagementSystem>,
    pub tenants: HashMap<String, Uuid>,
    pub skus: HashMap<String, Uuid>,
    pub orders: HashMap<String, OrderId>,
    pub webhook_urls: HashMap<String, String>,
    pub last_error: Option<String>,
    pub last_report: Option<IngestReport>,
}

impl OmsWorld {
    pub fn system(&self) -> &OrderManagementSystem {
        self.system.as_ref().expect("System not initialised")
    }

    pub fn tenant(&mut self, name: &str) -> Uuid {
        *self.tenants.entry(name.to_string()).or_insert_with(Uuid::new_v4)
    }

    pub fn sku(&mut self, name: &str) -> Uuid {
        *self.skus.entry(name.to_string()).or_insert_with(Uuid::new_v4)
    }

    pub fn order_id(&mut self, name: &str) -> OrderId {
        *self.orders.entry(name.to_string()).or_insert_with(OrderId::random)
    }
}

pub struct OrderManagementSystem {
    pub db_path: String,
    pub dir: TempDir,
    pub db: SqliteDatabase,
    pub inventory: StubInventory,
    pub delivery: RecordingDelivery,
    pub store: LocalObjectStore,
    pub queue: MemoryQueue,
    pub publisher: BulkIntakePublisher<LocalObjectStore, MemoryQueue>,
    pub orders: Orders,
    pub ingest: Ingest,
    pub webhooks: Webhooks,
    pub lifecycle: Lifecycle,
    pub handled: Arc<AtomicUsize>,
    pub shutdown: CancellationToken,
}

impl Debug for OrderManagementSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderManagementSystem ({})", self.db_path)
    }
}

impl OrderManagementSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let dir = tempfile::tempdir().expect("Error creating scratch directory");
        let store = LocalObjectStore::new(dir.path().join("objects"));
        let queue = MemoryQueue::new(Duration::from_millis(50));
        let publisher = BulkIntakePublisher::new(store.clone(), queue.clone());
        let inventory = StubInventory::new();
        let delivery = RecordingDelivery::new();
        let (events, subscription) = channel_event_log(2, 32);
        let orders = OrderFlowApi::new(db.clone(), inventory.clone(), events).with_publish_retries(1);
        let config = IngestConfig {
            staging_dir: dir.path().join("staging"),
            public_dir: dir.path().join("public"),
            public_base_url: "http://localhost:8080/public".to_string(),
            batch_size: 2,
        };
        let ingest = BulkIngestApi::new(store.clone(), orders.clone(), config);
        let webhooks = WebhookApi::new(db.clone(), MemoryWebhookCache::new(), delivery.clone());
        let lifecycle = LifecycleApi::new(db.clone(), inventory.clone(), webhooks.clone());

        let handled = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();
        let handler: Handler<LifecycleEvent> = {
            let lifecycle = lifecycle.clone();
            let handled = handled.clone();
            Arc::new(move |ev: LifecycleEvent| {
                let lifecycle = lifecycle.clone();
                let handled = handled.clone();
                Box::pin(async move {
                    if let Err(e) = lifecycle.handle_event(&ev).await {
                        warn!("🚀️ Event {} failed. {e}", ev.key);
                    }
                    handled.fetch_add(1, Ordering::SeqCst);
                }) as Pin<Box<dyn Future<Output = ()> + Send>>
            })
        };
        tokio::spawn(subscription.start(handler, shutdown.clone()));
        sleep(Duration::from_millis(50)).await;
        Self {
            db_path: url,
            dir,
            db,
            inventory,
            delivery,
            store,
            queue,
            publisher,
            orders,
            ingest,
            webhooks,
            lifecycle,
            handled,
            shutdown,
        }
    }

    /// Waits up to two seconds for the lifecycle consumer to have handled `count` events in total
    pub async fn wait_for_events(&self, count: usize) -> usize {
        for _ in 0..200 {
            let handled = self.handled.load(Ordering::SeqCst);
            if handled >= count {
                return handled;
            }
            sleep(Duration::from_millis(10)).await;
        }
        self.handled.load(Ordering::SeqCst)
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
