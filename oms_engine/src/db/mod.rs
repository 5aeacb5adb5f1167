//! #  Database management and control.
//!
//! This module provides the interfaces that define the contracts of the order store *backends*, and the SQLite
//! implementation of those contracts.
//!
//! * [`traits::OrderManagement`] stores orders and moves them through their lifecycle.
//! * [`traits::WebhookManagement`] stores the per-tenant webhook registrations.
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;
