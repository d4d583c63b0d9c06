//! # taskhub-storage
//!
//! Local filesystem storage for uploaded files (avatars, task attachments,
//! chat attachments) and the upload policy that gates them.

pub mod local;
pub mod paths;
pub mod policy;

pub use local::LocalStorageProvider;
pub use policy::{UploadPolicy, ValidatedUpload};
