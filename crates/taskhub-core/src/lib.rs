//! # taskhub-core
//!
//! Core crate for TaskHub. Contains configuration schemas, shared
//! pagination types, the storage provider trait, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other TaskHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
