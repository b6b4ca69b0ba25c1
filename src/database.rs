//! Database connection management.
//!
//! Owns the Postgres pool for the lifetime of the process and hands out
//! store adapters that borrow it.

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::store::PgInstanceStore;

/// Database connection manager
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Create a new database manager from the broker configuration
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BrokerError> {
        info!(
            "Connecting to database: {}",
            mask_database_url(&config.database_url)
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    pub fn instance_store(&self) -> PgInstanceStore {
        PgInstanceStore::new(self.pool.clone())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

/// Mask sensitive information in database URL for logging
pub fn mask_database_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let mut masked = parsed.clone();
            if parsed.password().is_some() {
                let _ = masked.set_password(Some("***"));
            }
            masked.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_password() {
        let masked = mask_database_url("postgresql://broker:s3cret@db:5432/servicebroker");
        assert_eq!(masked, "postgresql://broker:***@db:5432/servicebroker");
    }

    #[test]
    fn leaves_passwordless_url_alone() {
        let url = "postgresql://localhost:5432/servicebroker";
        assert_eq!(mask_database_url(url), url);
    }

    #[test]
    fn unparseable_url_is_hidden() {
        assert_eq!(
            mask_database_url("not a url"),
            "<unparseable database url>"
        );
    }
}
