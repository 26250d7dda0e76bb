//! Health check and banner handlers.

use axum::Json;

use crate::dto::response::{ApiResponse, HealthResponse};

/// GET /
pub async fn root() -> &'static str {
    "Keyward authentication API is running"
}

/// GET /api/health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(
        "OK",
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    ))
}
