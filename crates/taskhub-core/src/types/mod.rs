//! Core type definitions used across the TaskHub workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
