//! Service instance handlers.
//!
//! PUT    /v2/service_instances/:instance_id  - provision
//! DELETE /v2/service_instances/:instance_id  - deprovision
//! GET    /health                             - liveness

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::lifecycle::{InstanceLifecycle, Outcome};
use crate::types::ProvisionRequest;

/// Request summary attached to store-failure logs.
fn request_context(
    method: &Method,
    uri: &Uri,
    instance_id: &str,
    body: Option<&ProvisionRequest>,
) -> Value {
    json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "params": { "instance_id": instance_id },
        "body": body,
    })
}

pub async fn provision(
    State(lifecycle): State<InstanceLifecycle>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(instance_id): Path<String>,
    Json(req): Json<ProvisionRequest>,
) -> Response {
    let outcome = lifecycle.provision(&instance_id, req.scope()).await;
    if let Outcome::StoreFailure(err) = &outcome {
        let request = request_context(&method, &uri, &instance_id, Some(&req));
        tracing::error!(request = %request, error = %err, "Fail to handle request");
    }
    outcome.into_response()
}

pub async fn deprovision(
    State(lifecycle): State<InstanceLifecycle>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(instance_id): Path<String>,
) -> Response {
    let outcome = lifecycle.deprovision(&instance_id).await;
    if let Outcome::StoreFailure(err) = &outcome {
        let request = request_context(&method, &uri, &instance_id, None);
        tracing::error!(request = %request, error = %err, "Fail to handle request");
    }
    outcome.into_response()
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
