//! # Order management engine public API
//!
//! The `oms_api` module exposes the programmatic API of the order pipeline. The API is modular, so that the HTTP
//! server and the background workers can each pick the parts they need.
//!
//! * [`order_flow_api`] validates, stores and announces new orders, whichever entry path they arrive on.
//! * [`bulk_ingest_api`] stages queued CSV uploads and feeds their rows through the order flow.
//! * [`lifecycle_api`] re-checks `on_hold` orders with the inventory service, for both the event consumer and the
//!   retry sweep.
//! * [`webhook_api`] manages tenant webhook registrations and delivers notifications.
//!
//! # API usage
//!
//! Every API is created by handing it the collaborators it needs. For example:
//!
//! ```rust,ignore
//! use oms_engine::{events::channel_event_log, InventoryClient, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let inventory = InventoryClient::new(InventoryConfig::new_from_env_or_default())?;
//! let (events, subscription) = channel_event_log(4, 1024);
//! let api = OrderFlowApi::new(db, inventory, events);
//! let order = api.process_new_order(new_order, EventSource::OrderApi).await?;
//! ```
pub mod bulk_ingest_api;
pub mod errors;
pub mod lifecycle_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod validator;
pub mod webhook_api;

#[cfg(test)]
pub(crate) mod mocks;

pub use errors::{IngestError, LifecycleError, OrderFlowError, OrderValidationError, WebhookApiError};
pub use webhook_api::NotifyOutcome;
