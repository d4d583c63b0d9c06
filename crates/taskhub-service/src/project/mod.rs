//! Project services — CRUD and membership.

pub mod service;

pub use service::ProjectService;
