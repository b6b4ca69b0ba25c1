//! Instance lifecycle: the provision / deprovision decision rules.
//!
//! Stateless. Every request is one call into the [`InstanceStore`]; the store
//! is the serialization point for requests that share an instance id.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::error::StoreError;
use crate::store::InstanceStore;
use crate::types::{InstanceRecord, InstanceScope, ProvisionResponse};

/// Closed set of request outcomes, mapped one-to-one onto status codes.
#[derive(Debug)]
pub enum Outcome {
    /// Provision inserted a new record.
    Created,
    /// Provision found a record with the identical (instance, org, space) key.
    AlreadyExists,
    /// Deprovision removed the record.
    Deleted,
    /// Provision hit an instance id owned by a different scope.
    Conflict,
    /// Deprovision found no record.
    NotFound,
    /// Any other store failure. Carries the error for server-side logging.
    StoreFailure(StoreError),
}

impl Outcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Created => StatusCode::CREATED,
            Self::AlreadyExists | Self::Deleted => StatusCode::OK,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::GONE,
            Self::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreFailure(_))
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Created | Self::AlreadyExists => {
                (status, Json(ProvisionResponse::default())).into_response()
            }
            Self::Deleted | Self::NotFound => (status, Json(json!({}))).into_response(),
            // No detail leaves the process; the handler logs the error.
            Self::Conflict | Self::StoreFailure(_) => status.into_response(),
        }
    }
}

#[derive(Clone)]
pub struct InstanceLifecycle {
    store: Arc<dyn InstanceStore>,
}

impl InstanceLifecycle {
    pub fn new(store: Arc<dyn InstanceStore>) -> Self {
        Self { store }
    }

    /// Create-or-confirm the instance under `scope`.
    pub async fn provision(&self, instance_id: &str, scope: InstanceScope) -> Outcome {
        let record = InstanceRecord::new(instance_id, scope);
        match self.store.find_or_create(&record).await {
            Ok(found) if found.created => Outcome::Created,
            Ok(_) => Outcome::AlreadyExists,
            Err(StoreError::UniqueViolation { .. }) => Outcome::Conflict,
            Err(e) => Outcome::StoreFailure(e),
        }
    }

    /// Remove the instance if present. The delete is awaited before the
    /// outcome is reported.
    pub async fn deprovision(&self, instance_id: &str) -> Outcome {
        match self.store.find_by_id(instance_id).await {
            Ok(None) => Outcome::NotFound,
            Ok(Some(_)) => match self.store.delete_by_id(instance_id).await {
                Ok(count) => {
                    debug!(instance_id, count, "service instance deleted");
                    Outcome::Deleted
                }
                Err(e) => Outcome::StoreFailure(e),
            },
            Err(e) => Outcome::StoreFailure(e),
        }
    }
}
