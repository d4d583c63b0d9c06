//! Session lifecycle management: login, token refresh, and logout.

pub mod manager;

pub use manager::{AuthenticatedRequest, LoginResult, SessionManager};
