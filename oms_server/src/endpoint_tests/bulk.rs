use std::time::Duration;

use actix_web::{http::StatusCode, test::TestRequest, web};
use oms_engine::intake::{BulkIntakePublisher, LocalObjectStore, MemoryQueue, ObjectPath, ObjectStore};
use serde_json::{json, Value};
use tempfile::TempDir;

use super::helpers::send_request;
use crate::routes::{BulkOrderRoute, UploadCsvRoute, UploadTarget};

struct Intake {
    root: TempDir,
    store: LocalObjectStore,
    queue: MemoryQueue,
}

impl Intake {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(root.path().join("objects"));
        let queue = MemoryQueue::new(Duration::from_millis(5));
        Self { root, store, queue }
    }

    fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let publisher = BulkIntakePublisher::new(self.store.clone(), self.queue.clone());
        move |cfg| {
            cfg.app_data(web::Data::new(publisher))
                .app_data(web::Data::new(UploadTarget(ObjectPath::new("uploads", "orders.csv"))))
                .service(BulkOrderRoute::<LocalObjectStore, MemoryQueue>::new())
                .service(UploadCsvRoute::<LocalObjectStore, MemoryQueue>::new());
        }
    }
}

#[actix_web::test]
async fn existing_files_are_queued() {
    let _ = env_logger::try_init().ok();
    let intake = Intake::new();
    intake.store.put_object("orders", "2024/june.csv", b"Order_ID*\n".to_vec()).await.unwrap();
    let req = TestRequest::post().uri("/order/bulkorder").set_json(json!({"filePath": "s3://orders/2024/june.csv"}));
    let (status, body) = send_request(req, intake.configure()).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["filePath"], "s3://orders/2024/june.csv");
    assert_eq!(intake.queue.len(), 1);
}

#[actix_web::test]
async fn malformed_paths_are_rejected() {
    let intake = Intake::new();
    for path in ["orders/june.csv", "s3://orders", "s3:///june.csv", ""] {
        let req = TestRequest::post().uri("/order/bulkorder").set_json(json!({ "filePath": path }));
        let (status, _) = send_request(req, intake.configure()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path} should be rejected");
    }
    assert!(intake.queue.is_empty());
}

#[actix_web::test]
async fn missing_files_are_rejected() {
    let intake = Intake::new();
    let req = TestRequest::post().uri("/order/bulkorder").set_json(json!({"filePath": "s3://orders/nope.csv"}));
    let (status, body) = send_request(req, intake.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("nope.csv"));
    assert!(intake.queue.is_empty());
}

#[actix_web::test]
async fn keys_that_escape_the_bucket_are_rejected() {
    let intake = Intake::new();
    intake.store.put_object("orders", "x.csv", b"Order_ID*\n".to_vec()).await.unwrap();
    for path in ["s3://orders/../x.csv", "s3://orders/a/../../orders/x.csv"] {
        let req = TestRequest::post().uri("/order/bulkorder").set_json(json!({ "filePath": path }));
        let (status, body) = send_request(req, intake.configure()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path} should be rejected");
        assert!(body.contains("Invalid object key"), "{body}");
    }
    assert!(intake.queue.is_empty());
}

#[actix_web::test]
async fn bad_bodies_are_rejected() {
    let intake = Intake::new();
    let req = TestRequest::post().uri("/order/bulkorder").set_json(json!({"path": "s3://orders/a.csv"}));
    let (status, _) = send_request(req, intake.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn local_files_are_uploaded_but_not_queued() {
    let intake = Intake::new();
    let local = intake.root.path().join("local.csv");
    std::fs::write(&local, "Order_ID*,SKU_ID*\n").unwrap();
    let req = TestRequest::post().uri("/csv/filepath").set_json(json!({ "filePath": local.display().to_string() }));
    let (status, body) = send_request(req, intake.configure()).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["filePath"], "s3://uploads/orders.csv");
    assert_eq!(body["bytes"], 18);
    let meta = intake.store.head_object("uploads", "orders.csv").await.unwrap();
    assert_eq!(meta.size, 18);
    assert!(intake.queue.is_empty());

    let missing = intake.root.path().join("missing.csv");
    let req = TestRequest::post().uri("/csv/filepath").set_json(json!({ "filePath": missing.display().to_string() }));
    let (status, _) = send_request(req, intake.configure()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
