//! Per-request log line.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{info, warn};

/// Emits one line per request with method, path, status, and latency.
///
/// Server errors log at `warn` so they surface at the default filter.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "HTTP request");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "HTTP request");
    }

    response
}
