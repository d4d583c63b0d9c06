//! Response body compression.

use tower_http::compression::CompressionLayer;

/// Gzip layer for API responses; clients opt in via `Accept-Encoding`.
pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
