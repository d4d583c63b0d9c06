//! # taskhub-api
//!
//! HTTP API layer for TaskHub built on Axum.
//!
//! Provides all REST endpoints, the WebSocket upgrade, middleware
//! (CORS, request logging, body limits), extractors, DTOs, and the
//! mapping from domain errors to the wire envelope.
//!
//! Every response body uses the same envelope:
//!
//! ```json
//! { "success": true, "data": ..., "message": null }
//! ```
//!
//! with `success: false` and a human-readable `message` on errors.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
