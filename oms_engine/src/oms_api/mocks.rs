use mockall::mock;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::traits::{OrderManagement, StoreError, WebhookManagement},
    db_types::{NewOrder, Order, OrderId, OrderStatusType, WebhookRegistration},
    events::{EventLogError, EventPublisher, LifecycleEvent},
    inventory::{InventoryError, InventoryService},
    order_objects::OrderQueryFilter,
    webhooks::{CacheError, DeliveryError, WebhookCache, WebhookDelivery},
};

mock! {
    pub Inventory {}
    impl InventoryService for Inventory {
        async fn validate_identity(&self, tenant_id: &Uuid, hub_id: &Uuid, sku_id: &Uuid) -> Result<bool, InventoryError>;
        async fn check_availability(&self, order: &Order) -> Result<bool, InventoryError>;
    }
    impl Clone for Inventory {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Store {}
    impl OrderManagement for Store {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;
        async fn fetch_orders_with_status(&self, status: OrderStatusType) -> Result<Vec<Order>, StoreError>;
        async fn transition_status(&self, order_id: &OrderId, from: OrderStatusType, to: OrderStatusType) -> Result<Option<Order>, StoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError>;
    }
    impl WebhookManagement for Store {
        async fn upsert_webhook(&self, tenant_id: &Uuid, url: &str) -> Result<WebhookRegistration, StoreError>;
        async fn fetch_webhook(&self, tenant_id: &Uuid) -> Result<Option<WebhookRegistration>, StoreError>;
    }
    impl Clone for Store {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Events {}
    impl EventPublisher for Events {
        async fn publish(&self, event: LifecycleEvent) -> Result<(), EventLogError>;
    }
    impl Clone for Events {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Cache {}
    impl WebhookCache for Cache {
        async fn get_url(&self, tenant_id: &Uuid) -> Result<Option<String>, CacheError>;
        async fn set_url(&self, tenant_id: &Uuid, url: &str) -> Result<(), CacheError>;
    }
    impl Clone for Cache {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Delivery {}
    impl WebhookDelivery for Delivery {
        async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError>;
    }
    impl Clone for Delivery {
        fn clone(&self) -> Self;
    }
}
