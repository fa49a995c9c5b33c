use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Health Check
///
/// Liveness only. Does not consult the classifier.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", example = json!({ "status": "ok" }))
    ),
    tag = "Observability"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
