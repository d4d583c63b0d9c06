//! Core traits defined in `taskhub-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
