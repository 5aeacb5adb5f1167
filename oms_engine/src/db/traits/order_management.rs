use super::StoreError;
use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
};

/// The `OrderManagement` trait defines the behaviour for storing orders and moving them through their lifecycle.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Stores a validated order. The backend stamps `created_at` and `updated_at` and sets the status to `on_hold`.
    ///
    /// Returns [`StoreError::DuplicateOrder`] if an order with the same `order_id` already exists. The existing order
    /// is left untouched.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Fetches every order that currently has the given status, oldest first.
    async fn fetch_orders_with_status(&self, status: OrderStatusType) -> Result<Vec<Order>, StoreError>;

    /// Sets the order's status to `to`, but only if its current status is `from`. `updated_at` is refreshed on
    /// success.
    ///
    /// Returns `None` if the order does not exist, or if its status is no longer `from`.
    async fn transition_status(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, StoreError>;

    /// Fetches orders matching the filter, ordered by `created_at` ascending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, StoreError>;
}
