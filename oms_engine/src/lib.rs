//! Order Management Engine
//!
//! This library contains the core logic of a multi-tenant order management service. Orders arrive either one at a
//! time through the order API, or in bulk as CSV files that are uploaded to object storage and queued for processing.
//! Either way, each order is validated, stored as `on_hold`, and announced on the event log. A consumer of the event
//! log then asks the inventory service whether the order can be fulfilled, moves it to `new_order` when it can, and
//! notifies the tenant's webhook. A periodic sweep re-checks every order that is still on hold.
//!
//! The library is divided into these main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. The data types stored in the
//!    database are defined in the [`db_types`] module and are public.
//! 2. The engine's public API ([`mod@oms_api`]), which implements the pipeline on top of the backend traits and the
//!    collaborator traits below.
//! 3. Collaborators: [`intake`] (object store, intake queue, file staging), [`csv_ingest`] (batched CSV parsing),
//!    [`events`] (the lifecycle event log), [`inventory`] (the external inventory service) and [`webhooks`] (URL
//!    cache and HTTP delivery). Each is a trait with a local or HTTP implementation.
pub mod db;

pub mod csv_ingest;
pub mod db_types;
pub mod events;
pub mod intake;
pub mod inventory;
pub mod oms_api;
pub mod webhooks;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::{OrderManagement, StoreError, WebhookManagement};
pub use inventory::{InventoryClient, InventoryConfig, InventoryService};
pub use oms_api::{
    bulk_ingest_api::{BulkIngestApi, Disposition, IngestConfig, IngestReport},
    errors::{IngestError, LifecycleError, OrderFlowError, OrderValidationError, WebhookApiError},
    lifecycle_api::{LifecycleApi, RecheckOutcome, SweepReport},
    order_flow_api::OrderFlowApi,
    order_objects,
    webhook_api::{NotifyOutcome, WebhookApi},
};
