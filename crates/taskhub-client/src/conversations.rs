//! Per-conversation unread message counters.
//!
//! The conversation list endpoint reports each member's unread count
//! derived from `last_read_at`; this watch keeps those numbers live
//! between fetches by applying chat messages pushed over the live
//! connection. Messages sent by the watching user never count.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use uuid::Uuid;

use taskhub_entity::chat::{ChatMessage, ConversationSummary};

/// Live unread counters, one per conversation.
pub struct ConversationWatch {
    user_id: Uuid,
    counts: Mutex<HashMap<Uuid, i64>>,
    revision: watch::Sender<u64>,
}

impl ConversationWatch {
    /// Create an empty watch for `user_id`. Seed it from a fetched
    /// conversation list before relying on the counts.
    pub fn new(user_id: Uuid) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            user_id,
            counts: Mutex::new(HashMap::new()),
            revision,
        }
    }

    /// Subscribe to a counter that bumps whenever any count changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Replace all counters with the server-reported summaries.
    pub fn seed(&self, summaries: &[ConversationSummary]) {
        {
            let mut counts = self.lock();
            counts.clear();
            for summary in summaries {
                counts.insert(summary.conversation.id, summary.unread_count);
            }
        }
        self.touch();
    }

    /// Count one pushed message. The user's own messages are skipped;
    /// the next `seed` reconciles with the server either way.
    pub fn apply_message(&self, message: &ChatMessage) {
        if message.sender_id == self.user_id {
            return;
        }
        *self.lock().entry(message.conversation_id).or_insert(0) += 1;
        self.touch();
    }

    /// Zero one conversation's counter after marking it read.
    pub fn mark_read(&self, conversation_id: Uuid) {
        self.lock().insert(conversation_id, 0);
        self.touch();
    }

    /// The unread count for one conversation.
    pub fn unread(&self, conversation_id: Uuid) -> i64 {
        self.lock().get(&conversation_id).copied().unwrap_or(0)
    }

    /// Unread messages across all conversations.
    pub fn total_unread(&self) -> i64 {
        self.lock().values().sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, i64>> {
        self.counts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}
