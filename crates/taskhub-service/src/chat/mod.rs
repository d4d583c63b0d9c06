//! Chat services — conversations, messages, attachments.

pub mod service;

pub use service::ChatService;
