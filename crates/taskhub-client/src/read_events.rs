//! Locally-tracked read state for calendar events.
//!
//! The server stores calendar events but never records which of them a
//! user has seen in the feed. Each client keeps its own set of read
//! event IDs, persisted per user as a JSON array.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::ClientResult;

/// Persisted set of calendar event IDs the user has dismissed.
#[derive(Debug)]
pub struct ReadEventSet {
    path: PathBuf,
    ids: HashSet<Uuid>,
}

impl ReadEventSet {
    /// Open the read-event set for `user_id` under `dir`.
    ///
    /// An unreadable file starts the set empty; old events then
    /// reappear in the feed, which is harmless.
    pub fn open(dir: &Path, user_id: Uuid) -> ClientResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("read_events_{user_id}.json"));
        let ids = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<Uuid>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "unreadable read-event file, starting empty"
                    );
                    HashSet::new()
                }
            },
            Err(_) => HashSet::new(),
        };
        Ok(Self { path, ids })
    }

    /// Check whether `id` has been marked read.
    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Mark one event as read. Returns `true` when newly inserted.
    pub fn insert(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    /// Mark every ID in `ids` as read.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.ids.extend(ids);
    }

    /// Number of recorded read events.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Persist the set to disk.
    pub fn save(&self) -> ClientResult<()> {
        let mut list: Vec<Uuid> = self.ids.iter().copied().collect();
        // Deterministic file contents.
        list.sort();
        let raw = serde_json::to_string_pretty(&list)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = ReadEventSet::open(dir.path(), Uuid::new_v4()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let user_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut set = ReadEventSet::open(dir.path(), user_id).unwrap();
        set.insert(a);
        set.extend([b]);
        set.save().unwrap();

        let reopened = ReadEventSet::open(dir.path(), user_id).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.contains(a));
        assert!(reopened.contains(b));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = ReadEventSet::open(dir.path(), Uuid::new_v4()).unwrap();
        let id = Uuid::new_v4();
        assert!(set.insert(id));
        assert!(!set.insert(id));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sets_are_keyed_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let id = Uuid::new_v4();

        let mut alice_set = ReadEventSet::open(dir.path(), alice).unwrap();
        alice_set.insert(id);
        alice_set.save().unwrap();

        let bob_set = ReadEventSet::open(dir.path(), bob).unwrap();
        assert!(!bob_set.contains(id));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let user_id = Uuid::new_v4();
        fs::write(
            dir.path().join(format!("read_events_{user_id}.json")),
            "][",
        )
        .unwrap();

        let set = ReadEventSet::open(dir.path(), user_id).unwrap();
        assert!(set.is_empty());
    }
}
