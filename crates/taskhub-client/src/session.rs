//! On-disk session persistence.
//!
//! The token pair survives process restarts so users do not log in on
//! every launch. Tokens are written as plain JSON under the client
//! state directory; file permissions are left to the platform.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use taskhub_entity::user::User;

use crate::error::ClientResult;

/// File name of the persisted session.
const SESSION_FILE: &str = "session.json";

/// A logged-in session as persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Base URL of the server the session belongs to.
    pub server_url: String,
    /// Short-lived bearer token sent with every API request.
    pub access_token: String,
    /// Long-lived token used to mint a new access token.
    pub refresh_token: String,
    /// The logged-in user as the server returned it.
    pub user: User,
}

/// Holds the current session in memory and mirrors it to disk.
pub struct SessionStore {
    path: PathBuf,
    state: Mutex<Option<StoredSession>>,
}

impl SessionStore {
    /// Open the store rooted at `dir`, loading any persisted session.
    ///
    /// An unreadable session file is discarded with a warning rather
    /// than failing the open; the user simply has to log in again.
    pub fn open(dir: &Path) -> ClientResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(SESSION_FILE);
        let state = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "discarding unreadable session file"
                    );
                    None
                }
            },
            Err(_) => None,
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<StoredSession> {
        self.lock().clone()
    }

    /// The current access token, if logged in.
    pub fn access_token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.access_token.clone())
    }

    /// The current refresh token, if logged in.
    pub fn refresh_token(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.refresh_token.clone())
    }

    /// The logged-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.lock().as_ref().map(|s| s.user.clone())
    }

    /// The server the session belongs to, if logged in.
    pub fn server_url(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.server_url.clone())
    }

    /// Check whether a session is present.
    pub fn is_logged_in(&self) -> bool {
        self.lock().is_some()
    }

    /// Replace the session and persist it.
    pub fn store(&self, session: StoredSession) -> ClientResult<()> {
        let raw = serde_json::to_string_pretty(&session)?;
        fs::write(&self.path, raw)?;
        *self.lock() = Some(session);
        Ok(())
    }

    /// Swap in a fresh token pair, keeping the stored user.
    ///
    /// A no-op when no session is stored.
    pub fn update_tokens(&self, access_token: String, refresh_token: String) -> ClientResult<()> {
        let updated = {
            let mut guard = self.lock();
            guard.as_mut().map(|session| {
                session.access_token = access_token;
                session.refresh_token = refresh_token;
                session.clone()
            })
        };
        if let Some(session) = updated {
            let raw = serde_json::to_string_pretty(&session)?;
            fs::write(&self.path, raw)?;
        }
        Ok(())
    }

    /// Drop the session from memory and disk.
    pub fn clear(&self) -> ClientResult<()> {
        *self.lock() = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<StoredSession>> {
        // A panic while holding the lock leaves plain data behind;
        // recover the guard instead of propagating the poison.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskhub_entity::user::{UserRole, UserStatus};
    use uuid::Uuid;

    fn sample_session() -> StoredSession {
        StoredSession {
            server_url: "http://localhost:8080".to_string(),
            access_token: "access-abc".to_string(),
            refresh_token: "refresh-xyz".to_string(),
            user: User {
                id: Uuid::new_v4(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: String::new(),
                display_name: Some("Alice".to_string()),
                avatar_path: None,
                role: UserRole::User,
                status: UserStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                last_login_at: None,
            },
        }
    }

    #[test]
    fn test_store_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let session = sample_session();

        let store = SessionStore::open(dir.path()).unwrap();
        assert!(!store.is_logged_in());
        store.store(session.clone()).unwrap();

        let reopened = SessionStore::open(dir.path()).unwrap();
        assert_eq!(reopened.access_token().unwrap(), "access-abc");
        assert_eq!(reopened.user().unwrap().username, "alice");
    }

    #[test]
    fn test_update_tokens_keeps_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.store(sample_session()).unwrap();

        store
            .update_tokens("access-2".to_string(), "refresh-2".to_string())
            .unwrap();

        let reopened = SessionStore::open(dir.path()).unwrap();
        assert_eq!(reopened.access_token().unwrap(), "access-2");
        assert_eq!(reopened.refresh_token().unwrap(), "refresh-2");
        assert_eq!(reopened.user().unwrap().username, "alice");
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.store(sample_session()).unwrap();
        store.clear().unwrap();

        assert!(!store.is_logged_in());
        assert!(!dir.path().join(SESSION_FILE).exists());
        let reopened = SessionStore::open(dir.path()).unwrap();
        assert!(!reopened.is_logged_in());
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "not json{{").unwrap();

        let store = SessionStore::open(dir.path()).unwrap();
        assert!(!store.is_logged_in());
    }
}
