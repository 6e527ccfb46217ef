use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Single source of truth for the current bearer token.
///
/// Holds at most one token: in memory for reads on the request path, and in
/// `session.json` so a login survives restarts. Setting a token silently
/// replaces the previous one. All methods take `&self` so the store can be
/// shared behind an `Arc` between the HTTP client (which clears it on 401)
/// and the rest of the app. Writes are last-write-wins.
///
/// The token is never logged and never embedded in error values.
pub struct SessionStore {
    cache_dir: PathBuf,
    token: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            token: Mutex::new(None),
        }
    }

    /// Load the persisted token from disk into memory.
    /// Returns true if a token was found.
    pub fn load(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        let stored: StoredSession =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        *self.lock() = Some(stored.token);
        Ok(true)
    }

    /// The current bearer token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Store a new token in memory and on disk, replacing any previous one.
    pub fn set_token(&self, token: String) -> Result<()> {
        *self.lock() = Some(token.clone());

        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&StoredSession { token })?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        Ok(())
    }

    /// Remove the token from memory and disk. Safe to call when already
    /// logged out, and from error handlers.
    pub fn clear(&self) -> Result<()> {
        *self.lock() = None;

        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Auth guard predicate: is there a token at all?
    /// Whether it is still accepted is the server's call (401 clears it).
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the Option inside is still usable.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());

        assert_eq!(store.token(), None);
        assert!(!store.is_authenticated());

        store.set_token("X".to_string()).expect("set");
        assert_eq!(store.token().as_deref(), Some("X"));
        assert!(store.is_authenticated());

        store.clear().expect("clear");
        assert_eq!(store.token(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_set_replaces_previous_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());

        store.set_token("first".to_string()).expect("set");
        store.set_token("second".to_string()).expect("set");
        assert_eq!(store.token().as_deref(), Some("second"));
    }

    #[test]
    fn test_token_survives_reload_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());
        store.set_token("persisted".to_string()).expect("set");

        let reloaded = SessionStore::new(dir.path().to_path_buf());
        assert!(reloaded.load().expect("load"));
        assert_eq!(reloaded.token().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_load_with_no_file_is_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(!store.load().expect("load"));
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_clear_removes_session_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().to_path_buf());
        store.set_token("tok".to_string()).expect("set");
        store.clear().expect("clear");

        let reloaded = SessionStore::new(dir.path().to_path_buf());
        assert!(!reloaded.load().expect("load"));
    }
}
