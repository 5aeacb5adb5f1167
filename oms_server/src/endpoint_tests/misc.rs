use actix_web::{http::StatusCode, test::TestRequest, web};
use tempfile::TempDir;

use super::helpers::send_request;
use crate::routes::{health, PublicDir, PublicFileRoute};

#[actix_web::test]
async fn health_endpoint() {
    let req = TestRequest::get().uri("/health");
    let (status, body) = send_request(req, |cfg| {
        cfg.service(health);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

fn public_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("invalid_orders_1717243200_june.csv"), "Order_ID*,Error\n1,bad\n").unwrap();
    std::fs::write(dir.path().join(".env"), "SECRET=1\n").unwrap();
    dir
}

fn configure_public(dir: &TempDir) -> impl FnOnce(&mut web::ServiceConfig) {
    let public = PublicDir(dir.path().to_path_buf());
    move |cfg| {
        cfg.app_data(web::Data::new(public)).service(PublicFileRoute::new());
    }
}

#[actix_web::test]
async fn invalid_rows_files_can_be_downloaded() {
    let dir = public_dir();
    let req = TestRequest::get().uri("/public/invalid_orders_1717243200_june.csv");
    let (status, body) = send_request(req, configure_public(&dir)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Order_ID*,Error\n1,bad\n");

    let req = TestRequest::get().uri("/public/nothing_here.csv");
    let (status, _) = send_request(req, configure_public(&dir)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn hidden_files_are_not_served() {
    let dir = public_dir();
    for uri in ["/public/.env", "/public/..%5C.env"] {
        let req = TestRequest::get().uri(uri);
        let (status, _) = send_request(req, configure_public(&dir)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} should be rejected");
    }
}
