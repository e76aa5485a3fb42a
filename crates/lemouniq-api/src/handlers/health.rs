use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Plain-text reachability probe.
#[utoipa::path(
    get,
    path = "/test",
    tag = "health",
    responses((status = 200, description = "Backend is reachable", body = String))
)]
pub async fn reachability() -> &'static str {
    "The backend is reachable"
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "alive" })
}
