//! In-memory instance store.
//!
//! Find-or-create and delete run under a single write guard, which makes
//! them atomic with respect to concurrent callers.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use anyhow::anyhow;
use async_trait::async_trait;

use super::{FindOrCreate, InstanceStore, Result};
use crate::error::StoreError;
use crate::types::InstanceRecord;

#[derive(Debug, Default)]
pub struct MemoryInstanceStore {
    inner: RwLock<HashMap<String, InstanceRecord>>,
}

impl MemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// The inspection helpers read through a poisoned lock: every write is a
    /// single `insert` or `remove`, so the map is never left half-updated.
    /// Trait operations still report poisoning as [`StoreError::Backend`].
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the record stored under `instance_id`.
    pub fn get(&self, instance_id: &str) -> Option<InstanceRecord> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instance_id)
            .cloned()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(anyhow!("Lock: {}", e))
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn find_or_create(&self, record: &InstanceRecord) -> Result<FindOrCreate> {
        let mut store = self.inner.write().map_err(lock_error)?;
        match store.get(&record.instance_id) {
            Some(existing) if existing.same_key(record) => Ok(FindOrCreate {
                record: existing.clone(),
                created: false,
            }),
            Some(_) => Err(StoreError::UniqueViolation {
                instance_id: record.instance_id.clone(),
            }),
            None => {
                store.insert(record.instance_id.clone(), record.clone());
                Ok(FindOrCreate {
                    record: record.clone(),
                    created: true,
                })
            }
        }
    }

    async fn find_by_id(&self, instance_id: &str) -> Result<Option<InstanceRecord>> {
        let store = self.inner.read().map_err(lock_error)?;
        Ok(store.get(instance_id).cloned())
    }

    async fn delete_by_id(&self, instance_id: &str) -> Result<u64> {
        let mut store = self.inner.write().map_err(lock_error)?;
        Ok(store.remove(instance_id).map_or(0, |_| 1))
    }
}
