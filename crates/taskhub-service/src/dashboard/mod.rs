//! Dashboard summary service.

pub mod service;

pub use service::{DashboardService, DashboardSummary};
