//! Postgres-backed instance store.
//!
//! All SQL is runtime-checked (`sqlx::query`, not `sqlx::query!`) to avoid a
//! compile-time database requirement.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{FindOrCreate, InstanceStore, Result};
use crate::error::StoreError;
use crate::types::InstanceRecord;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS service_instances (
        service_instance_id TEXT PRIMARY KEY,
        org_id              TEXT NOT NULL,
        space_id            TEXT NOT NULL,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

#[derive(Debug, sqlx::FromRow)]
struct InstanceRow {
    service_instance_id: String,
    org_id: String,
    space_id: String,
    created_at: DateTime<Utc>,
}

impl From<InstanceRow> for InstanceRecord {
    fn from(row: InstanceRow) -> Self {
        Self {
            instance_id: row.service_instance_id,
            org_id: row.org_id,
            space_id: row.space_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgInstanceStore {
    pool: PgPool,
}

impl PgInstanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `service_instances` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        info!("service_instances schema ready");
        Ok(())
    }

    async fn find_by_key(&self, record: &InstanceRecord) -> Result<Option<InstanceRecord>> {
        let row = sqlx::query_as::<_, InstanceRow>(
            r#"
            SELECT service_instance_id, org_id, space_id, created_at
            FROM service_instances
            WHERE service_instance_id = $1
              AND org_id = $2
              AND space_id = $3
            "#,
        )
        .bind(&record.instance_id)
        .bind(&record.org_id)
        .bind(&record.space_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl InstanceStore for PgInstanceStore {
    async fn find_or_create(&self, record: &InstanceRecord) -> Result<FindOrCreate> {
        // The primary key serializes concurrent inserts; a losing insert
        // returns no row and falls through to the keyed lookup.
        let inserted = sqlx::query_as::<_, InstanceRow>(
            r#"
            INSERT INTO service_instances (service_instance_id, org_id, space_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (service_instance_id) DO NOTHING
            RETURNING service_instance_id, org_id, space_id, created_at
            "#,
        )
        .bind(&record.instance_id)
        .bind(&record.org_id)
        .bind(&record.space_id)
        .bind(record.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::UniqueViolation {
                    instance_id: record.instance_id.clone(),
                }
            } else {
                store_error(e)
            }
        })?;

        if let Some(row) = inserted {
            debug!(instance_id = %record.instance_id, "service instance inserted");
            return Ok(FindOrCreate {
                record: row.into(),
                created: true,
            });
        }

        match self.find_by_key(record).await? {
            Some(existing) => Ok(FindOrCreate {
                record: existing,
                created: false,
            }),
            None => Err(StoreError::UniqueViolation {
                instance_id: record.instance_id.clone(),
            }),
        }
    }

    async fn find_by_id(&self, instance_id: &str) -> Result<Option<InstanceRecord>> {
        let row = sqlx::query_as::<_, InstanceRow>(
            r#"
            SELECT service_instance_id, org_id, space_id, created_at
            FROM service_instances
            WHERE service_instance_id = $1
            "#,
        )
        .bind(instance_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_by_id(&self, instance_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM service_instances WHERE service_instance_id = $1")
            .bind(instance_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23505")
    )
}

fn store_error(error: sqlx::Error) -> StoreError {
    StoreError::Backend(anyhow!(error))
}

#[cfg(test)]
mod tests {
    //! Requires a running PostgreSQL database.
    //! Run with: DATABASE_URL="postgresql:///servicebroker" cargo test --features database -- --ignored

    use super::*;
    use crate::types::InstanceScope;
    use sqlx::postgres::PgPoolOptions;

    async fn test_store() -> PgInstanceStore {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("failed to connect to test database");
        let store = PgInstanceStore::new(pool);
        store.ensure_schema().await.expect("schema bootstrap failed");
        store
    }

    fn unique_id(prefix: &str) -> String {
        format!("{prefix}-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    #[ignore] // requires DATABASE_URL
    async fn find_or_create_is_idempotent() {
        let store = test_store().await;
        let id = unique_id("idem");
        let record = InstanceRecord::new(&id, InstanceScope::new("A", "S1"));

        assert!(store.find_or_create(&record).await.unwrap().created);
        assert!(!store.find_or_create(&record).await.unwrap().created);

        store.delete_by_id(&id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // requires DATABASE_URL
    async fn find_or_create_conflicting_scope() {
        let store = test_store().await;
        let id = unique_id("conflict");
        store
            .find_or_create(&InstanceRecord::new(&id, InstanceScope::new("A", "S1")))
            .await
            .unwrap();

        let err = store
            .find_or_create(&InstanceRecord::new(&id, InstanceScope::new("B", "S2")))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let stored = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.scope(), InstanceScope::new("A", "S1"));

        store.delete_by_id(&id).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // requires DATABASE_URL
    async fn delete_by_id_counts_rows() {
        let store = test_store().await;
        let id = unique_id("delete");
        store
            .find_or_create(&InstanceRecord::new(&id, InstanceScope::new("A", "S1")))
            .await
            .unwrap();

        assert_eq!(store.delete_by_id(&id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(&id).await.unwrap(), 0);
        assert!(store.find_by_id(&id).await.unwrap().is_none());
    }
}
