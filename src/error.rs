use thiserror::Error;

/// Failure kinds surfaced by an [`InstanceStore`](crate::store::InstanceStore).
///
/// Backends translate their native errors into this closed set so the
/// lifecycle can branch on the kind instead of inspecting error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The instance id already exists under a different organization/space.
    #[error("unique constraint violated for instance {instance_id}")]
    UniqueViolation { instance_id: String },

    /// Connectivity, serialization or any other unexpected backend failure.
    #[error("store backend: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

/// Process-level errors: configuration and startup.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "database")]
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}
