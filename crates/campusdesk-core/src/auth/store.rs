use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Student;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// The session fields written to durable storage.
///
/// Under the cookie-delegated scheme the access token is omitted - the
/// server holds it in an HTTP-only cookie the client never sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub student: Student,
}

/// Durable key-value storage for the session, backed by a single JSON
/// file so a reload can never observe a partially-written session.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Read the persisted session. Missing or malformed data reads as
    /// absent rather than failing - a corrupt file means logged out.
    pub fn load(&self) -> Option<PersistedSession> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Malformed session file, treating as logged out");
                None
            }
        }
    }

    /// Write the whole session record
    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        Ok(())
    }

    /// Remove the persisted session. A no-op when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student() -> Student {
        Student {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            major: "Mathematics".to_string(),
            year: 3,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SessionStore::new(dir.path().to_path_buf());

        let session = PersistedSession {
            access_token: Some("T1".to_string()),
            refresh_token: "R1".to_string(),
            student: sample_student(),
        };
        store.save(&session).expect("Save should succeed");

        let loaded = store.load().expect("Session should be present");
        assert_eq!(loaded.access_token.as_deref(), Some("T1"));
        assert_eq!(loaded.refresh_token, "R1");
        assert_eq!(loaded.student, sample_student());
    }

    #[test]
    fn test_empty_store_loads_as_absent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_malformed_file_loads_as_absent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join(SESSION_FILE), "{not json")
            .expect("Failed to write test file");

        let store = SessionStore::new(dir.path().to_path_buf());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SessionStore::new(dir.path().to_path_buf());

        let session = PersistedSession {
            access_token: None,
            refresh_token: "R1".to_string(),
            student: sample_student(),
        };
        store.save(&session).expect("Save should succeed");

        store.clear().expect("First clear should succeed");
        assert!(store.load().is_none());
        store.clear().expect("Second clear should also succeed");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_cookie_scheme_record_omits_access_token_key() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SessionStore::new(dir.path().to_path_buf());

        let session = PersistedSession {
            access_token: None,
            refresh_token: "R1".to_string(),
            student: sample_student(),
        };
        store.save(&session).expect("Save should succeed");

        let raw = std::fs::read_to_string(dir.path().join(SESSION_FILE))
            .expect("Session file should exist");
        assert!(!raw.contains("access_token"));
        assert!(raw.contains("refresh_token"));
    }
}
