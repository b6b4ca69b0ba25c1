//! Router construction for the service broker.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::lifecycle::InstanceLifecycle;

/// Build the full axum router with all routes and middleware.
pub fn build_router(lifecycle: InstanceLifecycle) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/v2/service_instances/:instance_id",
            put(handlers::provision).delete(handlers::deprovision),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(lifecycle)
}
