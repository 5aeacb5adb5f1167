use std::{str::FromStr, time::Duration};

use cucumber::{gherkin::Step, given, then, when};
use oms_engine::{
    db_types::{NewOrder, OrderStatusType, Price},
    events::EventSource,
    intake::{IntakeQueue, ObjectPath},
    Disposition,
    OrderManagement,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cucumber::OmsWorld;

async fn submit(world: &mut OmsWorld, tenant: &str, order: &str, sku_id: Uuid, quantity: i64, price: &str) {
    let tenant_id = world.tenant(tenant);
    let order_id = world.order_id(order);
    let price = Price::from_str(price).expect("Not a valid price");
    let order = NewOrder::new(sku_id, Uuid::new_v4(), Uuid::new_v4(), tenant_id, quantity, price).with_order_id(order_id);
    let result = world.system().orders.process_new_order(order, EventSource::OrderApi).await;
    match result {
        Ok(_) => world.last_error = None,
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when(expr = "tenant {string} submits order {string} for {int} units at {word}")]
async fn submit_order(world: &mut OmsWorld, tenant: String, order: String, quantity: i64, price: String) {
    submit(world, &tenant, &order, Uuid::new_v4(), quantity, &price).await;
}

#[when(expr = "tenant {string} submits order {string} for sku {string}")]
async fn submit_order_for_sku(world: &mut OmsWorld, tenant: String, order: String, sku: String) {
    let sku_id = world.sku(&sku);
    submit(world, &tenant, &order, sku_id, 1, "1.00").await;
}

#[then(expr = "the order was rejected with {string}")]
async fn order_rejected(world: &mut OmsWorld, message: String) {
    let err = world.last_error.as_ref().expect("The order was accepted");
    assert!(err.contains(&message), "Unexpected error: {err}");
}

#[then("the order was accepted")]
async fn order_accepted(world: &mut OmsWorld) {
    assert!(world.last_error.is_none(), "The order was rejected: {:?}", world.last_error);
}

#[when(expr = "stock is available for order {string}")]
async fn stock_available(world: &mut OmsWorld, order: String) {
    let order_id = world.order_id(&order);
    world.system().inventory.set_available(order_id, true);
}

#[when("the inventory service is down")]
async fn inventory_down(world: &mut OmsWorld) {
    world.system().inventory.set_service_down(true);
}

#[when("the inventory service is back")]
async fn inventory_up(world: &mut OmsWorld) {
    world.system().inventory.set_service_down(false);
}

#[when(expr = "I pause for {int}ms")]
async fn pause(_world: &mut OmsWorld, ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[then(expr = "the lifecycle consumer has handled {int} event(s)")]
async fn events_handled(world: &mut OmsWorld, count: usize) {
    let handled = world.system().wait_for_events(count).await;
    assert_eq!(handled, count, "Unexpected number of handled events");
}

#[then(expr = "order {string} has status {word}")]
async fn order_status(world: &mut OmsWorld, order: String, status: String) {
    let order_id = world.order_id(&order);
    let expected = OrderStatusType::from_str(&status).expect("Not a valid status");
    let stored = world.system().db.fetch_order(&order_id).await.expect("Error fetching order");
    let stored = stored.unwrap_or_else(|| panic!("Order {order} does not exist"));
    assert_eq!(stored.status, expected);
}

#[then(expr = "order {string} does not exist")]
async fn order_missing(world: &mut OmsWorld, order: String) {
    let order_id = world.order_id(&order);
    let stored = world.system().db.fetch_order(&order_id).await.expect("Error fetching order");
    assert!(stored.is_none(), "Order {order} exists");
}

#[then(expr = "tenant {string} received {int} webhook(s)")]
async fn webhook_count(world: &mut OmsWorld, tenant: String, count: usize) {
    let url = world.webhook_urls.get(&tenant).cloned().unwrap_or_default();
    let posts = world.system().delivery.posts().into_iter().filter(|(u, _)| *u == url).count();
    assert_eq!(posts, count);
}

#[then(expr = "the last webhook for tenant {string} reports order {string} as {word}")]
async fn last_webhook(world: &mut OmsWorld, tenant: String, order: String, status: String) {
    let url = world.webhook_urls.get(&tenant).cloned().expect("Tenant has no webhook");
    let order_id = world.order_id(&order).to_string();
    let posts = world.system().delivery.posts();
    let (_, body) = posts.iter().rev().find(|(u, _)| *u == url).expect("No webhook was delivered");
    assert_eq!(body["order_id"], order_id.as_str());
    assert_eq!(body["status"], status.as_str());
}

#[given(expr = "the object store holds {string} with rows")]
async fn upload_rows(world: &mut OmsWorld, step: &Step, path: String) {
    let table = step.table.as_ref().expect("A table of rows is required");
    let mut csv = String::from("Order_ID*,SKU_ID*,Hub_ID*,Seller_ID*,Tenant_ID*,Price*,Quantity*\n");
    for row in table.rows.iter().skip(1) {
        let (order, tenant, quantity, price) = (&row[0], &row[1], &row[2], &row[3]);
        let order_id = world.order_id(order);
        let tenant_id = world.tenant(tenant);
        csv.push_str(&format!(
            "{order_id},{},{},{},{tenant_id},{price},{quantity}\n",
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        ));
    }
    let object = ObjectPath::from_str(&path).expect("Not a valid object path");
    let local = world.system().dir.path().join("upload.csv");
    tokio::fs::write(&local, csv).await.expect("Error writing upload");
    world.system().publisher.upload_local_file(&local, &object).await.expect("Error uploading file");
}

#[when(expr = "the bulk file {string} is submitted")]
async fn submit_bulk_file(world: &mut OmsWorld, path: String) {
    let result = world.system().publisher.submit(&path).await;
    match result {
        Ok(_) => world.last_error = None,
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[then(expr = "the submission was rejected with {string}")]
async fn submission_rejected(world: &mut OmsWorld, message: String) {
    let err = world.last_error.as_ref().expect("The submission was accepted");
    assert!(err.contains(&message), "Unexpected error: {err}");
}

#[when("the intake worker processes the queue")]
async fn process_queue(world: &mut OmsWorld) {
    let system = world.system();
    let token = CancellationToken::new();
    let deliveries = system.queue.receive(10, Duration::from_secs(30)).await.expect("Error reading queue");
    for delivery in deliveries {
        if system.ingest.handle_delivery(&delivery, &token).await == Disposition::Ack {
            system.queue.ack(&delivery.receipt).await.expect("Error acknowledging message");
        }
    }
}

#[then(expr = "the intake queue holds {int} message(s)")]
async fn queue_length(world: &mut OmsWorld, count: usize) {
    assert_eq!(world.system().queue.len(), count);
}

#[when("the retry sweeper runs")]
async fn run_sweeper(world: &mut OmsWorld) {
    let report = world.system().lifecycle.sweep_on_hold().await.expect("Error sweeping orders");
    log::info!("🚀️ Sweep report: {report:?}");
}

#[then(expr = "the invalid rows file contains {int} row(s)")]
async fn invalid_rows(world: &mut OmsWorld, count: usize) {
    let public = world.system().dir.path().join("public");
    let mut files = std::fs::read_dir(&public).expect("No invalid rows were written");
    let file = files.next().expect("No invalid rows file").expect("Error reading public directory").path();
    let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    assert!(name.starts_with("invalid_orders_"), "Unexpected file {name}");
    let content = std::fs::read_to_string(&file).expect("Error reading invalid rows file");
    assert_eq!(content.lines().count() - 1, count);
}

#[then("no invalid rows file was written")]
async fn no_invalid_rows(world: &mut OmsWorld) {
    let public = world.system().dir.path().join("public");
    let count = std::fs::read_dir(&public).map(|d| d.count()).unwrap_or(0);
    assert_eq!(count, 0);
}
