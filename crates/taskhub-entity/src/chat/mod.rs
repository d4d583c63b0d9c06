//! Chat domain entities.

pub mod conversation;
pub mod message;

pub use conversation::{Conversation, ConversationKind, ConversationMember, ConversationSummary};
pub use message::ChatMessage;
