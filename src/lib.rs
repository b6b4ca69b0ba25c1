//! Service Broker - service instance provisioning lifecycle
//!
//! Implements the two instance endpoints of a broker-style HTTP API:
//!
//! - `PUT    /v2/service_instances/:instance_id` - create-or-confirm an instance
//! - `DELETE /v2/service_instances/:instance_id` - remove an instance
//!
//! ## Call chain
//! HTTP handler -> `InstanceLifecycle` -> `InstanceStore` -> `Outcome` -> status code
//!
//! The lifecycle is stateless; the store is the serialization point for
//! requests that touch the same instance id.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use service_broker::{lifecycle::InstanceLifecycle, router::build_router, store::MemoryInstanceStore};
//!
//! let lifecycle = InstanceLifecycle::new(Arc::new(MemoryInstanceStore::new()));
//! let app = build_router(lifecycle);
//! # let _ = app;
//! ```

// Core error handling
pub mod error;

// Instance record and wire types
pub mod types;

// Record store port and backends
pub mod store;

// Provision / deprovision decision logic
pub mod lifecycle;

// HTTP surface
pub mod handlers;
pub mod router;

// Process configuration
pub mod config;

// Database integration (when enabled)
#[cfg(feature = "database")]
pub mod database;

pub use error::{BrokerError, StoreError};
pub use lifecycle::{InstanceLifecycle, Outcome};
pub use types::{InstanceRecord, InstanceScope};
