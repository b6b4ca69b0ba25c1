//! service_broker - standalone REST server for service instance provisioning.
//!
//! Configuration is read from the environment (see `service_broker::config`),
//! after loading a `.env` file if one is present.

use std::sync::Arc;

use service_broker::config::BrokerConfig;
use service_broker::database::DatabaseManager;
use service_broker::error::BrokerError;
use service_broker::lifecycle::InstanceLifecycle;
use service_broker::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), BrokerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,service_broker=debug,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = BrokerConfig::from_env()?;

    let db = DatabaseManager::connect(&config).await?;
    let store = db.instance_store();
    store.ensure_schema().await?;

    let lifecycle = InstanceLifecycle::new(Arc::new(store));
    let app = build_router(lifecycle);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("service_broker listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("service_broker shutting down");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
