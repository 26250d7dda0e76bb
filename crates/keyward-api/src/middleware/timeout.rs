//! Per-request deadline.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use keyward_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Fails a request that runs past `server.request_timeout_seconds`.
///
/// The timeout is logged once, as an internal error, when the error
/// response is rendered.
pub async fn request_timeout(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let limit = state.config.server.request_timeout();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => ApiError(AppError::internal(format!(
            "Request to {path} timed out after {}s",
            limit.as_secs()
        )))
        .into_response(),
    }
}
