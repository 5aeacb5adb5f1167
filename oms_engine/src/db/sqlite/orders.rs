use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::traits::StoreError,
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
    order_objects::OrderQueryFilter,
};

/// Inserts a new order into the database using the given connection, with status `on_hold`.
///
/// The `order_id` column is unique, so a second insert for the same order fails with
/// [`StoreError::DuplicateOrder`] and leaves the stored order unchanged.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let now = Utc::now();
    let order_id = order.order_id;
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                sku_id,
                hub_id,
                seller_id,
                tenant_id,
                quantity,
                price,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.sku_id)
    .bind(order.hub_id)
    .bind(order.seller_id)
    .bind(order.tenant_id)
    .bind(order.quantity)
    .bind(order.price)
    .bind(OrderStatusType::OnHold)
    .bind(now)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("🗃️ Order [{order_id}] inserted");
            Ok(order)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::DuplicateOrder(order_id)),
        Err(e) => Err(e.into()),
    }
}

/// Returns the order with the given `order_id`, if it exists.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns every order with the given status, ordered by `created_at` ascending.
pub async fn fetch_orders_with_status(
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, StoreError> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE status = $1 ORDER BY created_at ASC")
        .bind(status)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Moves the order from `from` to `to`. Only the status and `updated_at` columns are written.
///
/// The update is conditional on the current status, so a stale reader can never move an order backwards. If the
/// order is missing, or its status is not `from`, nothing is written and `None` is returned.
pub async fn transition_status(
    order_id: &OrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StoreError> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = $2
            WHERE order_id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(Utc::now())
    .bind(order_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    match &order {
        Some(_) => debug!("🗃️ Order [{order_id}] moved from {from} to {to}"),
        None => trace!("🗃️ Order [{order_id}] was not in status {from}. No update made"),
    }
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, StoreError> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id);
    }
    if let Some(tenant_id) = query.tenant_id {
        where_clause.push("tenant_id = ");
        where_clause.push_bind_unseparated(tenant_id);
    }
    if let Some(seller_id) = query.seller_id {
        where_clause.push("seller_id = ");
        where_clause.push_bind_unseparated(seller_id);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
