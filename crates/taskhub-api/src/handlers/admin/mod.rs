//! Admin-only handlers.
//!
//! Authorization lives in the service layer: every `AdminUserService`
//! method checks the caller's role before touching data, so these
//! handlers only translate between HTTP and service types.

pub mod users;
