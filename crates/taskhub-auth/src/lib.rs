//! # taskhub-auth
//!
//! Authentication and authorization for the TaskHub platform.
//!
//! ## Modules
//!
//! - `jwt` — JWT token creation and validation
//! - `password` — Argon2id password hashing and policy enforcement
//! - `session` — Session lifecycle management (login, refresh, logout)
//! - `access` — Role-based access checks for tasks, projects, and events

pub mod access;
pub mod jwt;
pub mod password;
pub mod session;

pub use access::AccessPolicy;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{AuthenticatedRequest, LoginResult, SessionManager};
