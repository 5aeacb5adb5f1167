use actix_web::{http::StatusCode, test::TestRequest, web};
use oms_engine::{
    db_types::{NewOrder, OrderId, OrderStatusType, Price},
    events::{EventLogError, TENANT_HEADER},
    OrderFlowApi,
    StoreError,
};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{
    helpers::{send_request, stored},
    mocks::{MockEvents, MockInventory, MockOrderStore},
};
use crate::routes::{CreateOrderRoute, SearchOrdersRoute};

type TestOrderApi = OrderFlowApi<MockOrderStore, MockInventory, MockEvents>;

const TENANT: &str = "6d3c3b2e-1f0a-4c57-9b7e-3f1a7c2d9e01";

fn order_body() -> Value {
    json!({
        "sku_id": "0b6a9d2c-7e55-4c1f-a2d3-5e8f9a0b1c2d",
        "hub_id": "1c7b0e3d-8f66-4d20-b3e4-6f9a0b1c2d3e",
        "seller_id": "2d8c1f4e-9a77-4e31-84f5-7a0b1c2d3e4f",
        "quantity": 3,
        "price": "19.99"
    })
}

fn configure_orders(cfg: &mut web::ServiceConfig, api: TestOrderApi) {
    cfg.app_data(web::Data::new(api))
        .service(CreateOrderRoute::<MockOrderStore, MockInventory, MockEvents>::new())
        .service(SearchOrdersRoute::<MockOrderStore, MockInventory, MockEvents>::new());
}

fn accepting_inventory() -> MockInventory {
    let mut inventory = MockInventory::new();
    inventory.expect_validate_identity().returning(|_, _, _| Ok(true));
    inventory
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().times(1).returning(|order: NewOrder| Ok(stored(order)));
    let mut events = MockEvents::new();
    events
        .expect_publish()
        .withf(|event| event.key.starts_with("order-") && event.tenant_id() == Some(TENANT))
        .times(1)
        .returning(|_| Ok(()));
    let api = OrderFlowApi::new(store, accepting_inventory(), events);
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::CREATED);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "on_hold");
    assert_eq!(order["tenant_id"], TENANT);
    assert_eq!(order["quantity"], 3);
}

#[actix_web::test]
async fn create_order_keeps_the_supplied_order_id() {
    let order_id = OrderId(Uuid::new_v4());
    let mut store = MockOrderStore::new();
    store
        .expect_insert_order()
        .withf(move |order| order.order_id == order_id)
        .times(1)
        .returning(|order: NewOrder| Ok(stored(order)));
    let mut events = MockEvents::new();
    events.expect_publish().returning(|_| Ok(()));
    let api = OrderFlowApi::new(store, accepting_inventory(), events);
    let mut body = order_body();
    body["order_id"] = json!(order_id.to_string());
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(body);
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(&order_id.to_string()));
}

#[actix_web::test]
async fn create_order_needs_a_tenant() {
    let mut inventory = MockInventory::new();
    inventory.expect_validate_identity().never();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let api = OrderFlowApi::new(store, inventory, MockEvents::new());
    let req = TestRequest::post().uri("/orders").set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("X-Tenant-ID header is required"));

    let api = OrderFlowApi::new(MockOrderStore::new(), MockInventory::new(), MockEvents::new());
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, "acme")).set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not a valid tenant id"));
}

#[actix_web::test]
async fn invalid_orders_are_rejected_before_the_inventory_is_asked() {
    let mut inventory = MockInventory::new();
    inventory.expect_validate_identity().never();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let api = OrderFlowApi::new(store, inventory, MockEvents::new());
    let mut body = order_body();
    body["quantity"] = json!(0);
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(body);
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Quantity must be greater than zero"));
}

#[actix_web::test]
async fn unknown_skus_are_rejected() {
    let mut inventory = MockInventory::new();
    inventory.expect_validate_identity().times(1).returning(|_, _, _| Ok(false));
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let api = OrderFlowApi::new(store, inventory, MockEvents::new());
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("is not valid for hub"));
}

#[actix_web::test]
async fn duplicate_orders_conflict() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().returning(|order: NewOrder| Err(StoreError::DuplicateOrder(order.order_id)));
    let mut events = MockEvents::new();
    events.expect_publish().never();
    let api = OrderFlowApi::new(store, accepting_inventory(), events);
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already exists"));
}

#[actix_web::test]
async fn publish_failures_are_server_errors() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().times(1).returning(|order: NewOrder| Ok(stored(order)));
    let mut events = MockEvents::new();
    events.expect_publish().times(1).returning(|_| Err(EventLogError::Closed));
    let api = OrderFlowApi::new(store, accepting_inventory(), events).with_publish_retries(0);
    let req = TestRequest::post().uri("/orders").insert_header((TENANT_HEADER, TENANT)).set_json(order_body());
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("could not be published"));
}

#[actix_web::test]
async fn search_orders_for_a_tenant() {
    let tenant = Uuid::parse_str(TENANT).unwrap();
    let seller = Uuid::new_v4();
    let mut store = MockOrderStore::new();
    store
        .expect_search_orders()
        .withf(move |q| {
            q.tenant_id == Some(tenant) &&
                q.seller_id == Some(seller) &&
                q.status == Some(OrderStatusType::OnHold) &&
                q.since.is_some() &&
                q.until.is_some()
        })
        .times(1)
        .returning(move |_| {
            let order = NewOrder::new(Uuid::new_v4(), Uuid::new_v4(), seller, tenant, 2, Price::from(5));
            Ok(vec![stored(order)])
        });
    let api = OrderFlowApi::new(store, MockInventory::new(), MockEvents::new());
    let uri = format!("/orders?seller_id={seller}&status=on_hold&start_date=2024-06-01&end_date=2024-06-30");
    let req = TestRequest::get().uri(&uri).insert_header((TENANT_HEADER, TENANT));
    let (status, body) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["seller_id"], seller.to_string());
}

#[actix_web::test]
async fn search_with_inverted_dates_is_a_bad_request() {
    let mut store = MockOrderStore::new();
    store.expect_search_orders().never();
    let api = OrderFlowApi::new(store, MockInventory::new(), MockEvents::new());
    let req = TestRequest::get().uri("/orders?start_date=2024-07-01&end_date=2024-06-01");
    let (status, _) = send_request(req, move |cfg| configure_orders(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
