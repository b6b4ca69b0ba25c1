//! Record store port for service instances.
//!
//! The lifecycle operates exclusively through [`InstanceStore`], which lets
//! the Postgres backend be swapped for [`MemoryInstanceStore`] in tests.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::InstanceRecord;

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::MemoryInstanceStore;
#[cfg(feature = "database")]
pub use postgres::PgInstanceStore;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Result of an atomic find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindOrCreate {
    pub record: InstanceRecord,
    pub created: bool,
}

#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Find a record matching the full (instance, org, space) key or insert
    /// `record`, as one atomic operation.
    ///
    /// Returns [`StoreError::UniqueViolation`] when the instance id is held
    /// by a different scope.
    async fn find_or_create(&self, record: &InstanceRecord) -> Result<FindOrCreate>;

    async fn find_by_id(&self, instance_id: &str) -> Result<Option<InstanceRecord>>;

    /// Delete every record with this instance id. Returns the affected count.
    async fn delete_by_id(&self, instance_id: &str) -> Result<u64>;
}
