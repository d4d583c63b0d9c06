//! Per-user client settings persisted as JSON.
//!
//! Settings files are keyed by user ID so two accounts on the same
//! machine never see each other's preferences. A missing or unreadable
//! file falls back to defaults; it is rewritten on the next save.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskhub_entity::notification::NotificationKind;

use crate::error::ClientResult;

/// Notification preferences controlling the local feed.
///
/// `enabled` is the master switch: when off, the feed is empty and the
/// badge reads zero no matter what the per-kind switches say. The
/// per-kind switches hide matching items from the list but never change
/// the badge count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Master switch for the whole feed.
    pub enabled: bool,
    /// Show task-assignment notifications.
    pub task_assigned: bool,
    /// Show task-update notifications.
    pub task_updated: bool,
    /// Show task-completion notifications.
    pub task_completed: bool,
    /// Show deadline reminders.
    pub deadline_reminder: bool,
    /// Show new-message notifications.
    pub message_new: bool,
    /// Show calendar events as feed items.
    pub calendar_event: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            task_assigned: true,
            task_updated: true,
            task_completed: true,
            deadline_reminder: true,
            message_new: true,
            calendar_event: true,
        }
    }
}

impl NotificationSettings {
    /// Check whether items of `kind` should be shown.
    pub fn kind_enabled(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::TaskAssigned => self.task_assigned,
            NotificationKind::TaskUpdated => self.task_updated,
            NotificationKind::TaskCompleted => self.task_completed,
            NotificationKind::DeadlineReminder => self.deadline_reminder,
            NotificationKind::MessageNew => self.message_new,
            NotificationKind::CalendarEvent => self.calendar_event,
        }
    }

    /// Flip the per-kind switch for `kind`.
    pub fn set_kind(&mut self, kind: NotificationKind, enabled: bool) {
        match kind {
            NotificationKind::TaskAssigned => self.task_assigned = enabled,
            NotificationKind::TaskUpdated => self.task_updated = enabled,
            NotificationKind::TaskCompleted => self.task_completed = enabled,
            NotificationKind::DeadlineReminder => self.deadline_reminder = enabled,
            NotificationKind::MessageNew => self.message_new = enabled,
            NotificationKind::CalendarEvent => self.calendar_event = enabled,
        }
    }
}

/// Contents of a per-user settings file.
///
/// Unknown keys in older files are ignored; missing sections take their
/// defaults, so settings files survive upgrades in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Notification feed preferences.
    pub notifications: NotificationSettings,
}

/// Loads and saves per-user settings files under a state directory.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Load the settings for `user_id`.
    ///
    /// Falls back to defaults when the file is missing or unreadable.
    pub fn load(&self, user_id: Uuid) -> AppSettings {
        let path = self.path_for(user_id);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "unreadable settings file, using defaults"
                    );
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        }
    }

    /// Persist the settings for `user_id`.
    pub fn save(&self, user_id: Uuid, settings: &AppSettings) -> ClientResult<()> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(self.path_for(user_id), raw)?;
        Ok(())
    }

    fn path_for(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("app_settings_{user_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let settings = NotificationSettings::default();
        assert!(settings.enabled);
        for kind in NotificationKind::ALL {
            assert!(settings.kind_enabled(kind));
        }
    }

    #[test]
    fn test_set_kind_flips_only_that_kind() {
        let mut settings = NotificationSettings::default();
        settings.set_kind(NotificationKind::MessageNew, false);
        assert!(!settings.kind_enabled(NotificationKind::MessageNew));
        for kind in NotificationKind::ALL {
            if kind != NotificationKind::MessageNew {
                assert!(settings.kind_enabled(kind));
            }
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let user_id = Uuid::new_v4();

        let mut settings = AppSettings::default();
        settings.notifications.enabled = false;
        settings.notifications.deadline_reminder = false;
        store.save(user_id, &settings).unwrap();

        assert_eq!(store.load(user_id), settings);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        assert_eq!(store.load(Uuid::new_v4()), AppSettings::default());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let user_id = Uuid::new_v4();
        fs::write(
            dir.path().join(format!("app_settings_{user_id}.json")),
            "{broken",
        )
        .unwrap();

        assert_eq!(store.load(user_id), AppSettings::default());
    }

    #[test]
    fn test_settings_are_keyed_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut muted = AppSettings::default();
        muted.notifications.enabled = false;
        store.save(alice, &muted).unwrap();

        assert!(!store.load(alice).notifications.enabled);
        assert!(store.load(bob).notifications.enabled);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let user_id = Uuid::new_v4();
        fs::write(
            dir.path().join(format!("app_settings_{user_id}.json")),
            r#"{"notifications":{"enabled":false},"theme":"dark"}"#,
        )
        .unwrap();

        let settings = store.load(user_id);
        assert!(!settings.notifications.enabled);
        assert!(settings.notifications.task_assigned);
    }
}
