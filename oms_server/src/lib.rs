//! # OMS server
//! This crate hosts the HTTP surface of the order management service and the background workers that drive the
//! ingestion pipeline. It is responsible for:
//! * Accepting single orders and bulk-file submissions from tenants.
//! * Consuming the bulk intake queue, and ingesting each referenced CSV file.
//! * Consuming `order.created` events and re-checking inventory for new orders.
//! * Periodically sweeping orders that are still on hold.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/v1/orders`: Submit a single order.
//! * `GET /api/v1/orders`: Search orders.
//! * `POST /api/v1/order/bulkorder`: Submit a CSV file in the object store for bulk ingestion.
//! * `POST /api/v1/csv/filepath`: Copy a local CSV file into the object store.
//! * `POST /api/v1/webhooks/register`: Register the tenant's webhook URL.
//! * `GET /public/{file}`: Download an invalid-rows file.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

pub mod intake_worker;
pub mod lifecycle_worker;
pub mod sweep_worker;
