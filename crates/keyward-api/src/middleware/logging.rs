//! Access log.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info};

/// One line per request: method, path, status, latency.
///
/// Query strings and headers are never logged; credentials travel in both.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request handled");
    }

    response
}
