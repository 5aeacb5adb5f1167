use mockall::mock;
use oms_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, WebhookRegistration},
    events::{EventLogError, EventPublisher, LifecycleEvent},
    inventory::InventoryError,
    order_objects::OrderQueryFilter,
    InventoryService,
    OrderManagement,
    StoreError,
    WebhookManagement,
};
use uuid::Uuid;

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;
        async fn fetch_orders_with_status(&self, status: OrderStatusType) -> Result<Vec<Order>, StoreError>;
        async fn transition_status(&self, order_id: &OrderId, from: OrderStatusType, to: OrderStatusType) -> Result<Option<Order>, StoreError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError>;
    }
    impl WebhookManagement for OrderStore {
        async fn upsert_webhook(&self, tenant_id: &Uuid, url: &str) -> Result<WebhookRegistration, StoreError>;
        async fn fetch_webhook(&self, tenant_id: &Uuid) -> Result<Option<WebhookRegistration>, StoreError>;
    }
    impl Clone for OrderStore {
        fn clone(&self) -> Self;
    }
}

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
    pub Events {}
    impl EventPublisher for Events {
        async fn publish(&self, event: LifecycleEvent) -> Result<(), EventLogError>;
    }
    impl Clone for Events {
        fn clone(&self) -> Self;
    }
}
