use actix_web::{http::StatusCode, test::TestRequest, web};
use chrono::Utc;
use oms_engine::{
    db_types::WebhookRegistration,
    events::TENANT_HEADER,
    test_utils::stubs::RecordingDelivery,
    webhooks::{MemoryWebhookCache, WebhookCache},
    WebhookApi,
};
use serde_json::json;
use uuid::Uuid;

use super::{helpers::send_request, mocks::MockOrderStore};
use crate::routes::RegisterWebhookRoute;

type TestWebhookApi = WebhookApi<MockOrderStore, MemoryWebhookCache, RecordingDelivery>;

fn configure_webhooks(cfg: &mut web::ServiceConfig, api: TestWebhookApi) {
    cfg.app_data(web::Data::new(api))
        .service(RegisterWebhookRoute::<MockOrderStore, MemoryWebhookCache, RecordingDelivery>::new());
}

#[actix_web::test]
async fn register_webhook() {
    let _ = env_logger::try_init().ok();
    let tenant = Uuid::new_v4();
    let mut store = MockOrderStore::new();
    store
        .expect_upsert_webhook()
        .withf(move |t, url| *t == tenant && url.to_string() == "https://hooks.acme.test/orders")
        .times(1)
        .returning(|t, url| Ok(WebhookRegistration { tenant_id: *t, url: url.to_string(), created_at: Utc::now() }));
    let cache = MemoryWebhookCache::new();
    let api = WebhookApi::new(store, cache.clone(), RecordingDelivery::new());
    let req = TestRequest::post()
        .uri("/webhooks/register")
        .insert_header((TENANT_HEADER, tenant.to_string()))
        .set_json(json!({"url": "https://hooks.acme.test/orders"}));
    let (status, body) = send_request(req, move |cfg| configure_webhooks(cfg, api)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Webhook registered: https://hooks.acme.test/orders"));
    let cached = cache.get_url(&tenant).await.unwrap();
    assert_eq!(cached.as_deref(), Some("https://hooks.acme.test/orders"));
}

#[actix_web::test]
async fn invalid_urls_are_not_stored() {
    let mut store = MockOrderStore::new();
    store.expect_upsert_webhook().never();
    let cache = MemoryWebhookCache::new();
    let api = WebhookApi::new(store, cache.clone(), RecordingDelivery::new());
    let req = TestRequest::post()
        .uri("/webhooks/register")
        .insert_header((TENANT_HEADER, Uuid::new_v4().to_string()))
        .set_json(json!({"url": "ftp://hooks.acme.test"}));
    let (status, body) = send_request(req, move |cfg| configure_webhooks(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid webhook URL"));
    assert!(cache.is_empty());
}

#[actix_web::test]
async fn registration_needs_a_tenant() {
    let mut store = MockOrderStore::new();
    store.expect_upsert_webhook().never();
    let api = WebhookApi::new(store, MemoryWebhookCache::new(), RecordingDelivery::new());
    let req = TestRequest::post().uri("/webhooks/register").set_json(json!({"url": "https://hooks.acme.test"}));
    let (status, _) = send_request(req, move |cfg| configure_webhooks(cfg, api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
