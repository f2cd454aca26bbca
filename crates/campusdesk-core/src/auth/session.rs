use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::store::{PersistedSession, SessionStore};
use crate::models::Student;

/// Where the access token lives.
///
/// `Token` keeps both tokens client-side and attaches the access token as
/// a bearer header. `Cookie` leaves the access token with the server in an
/// HTTP-only cookie; only the refresh token and student are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScheme {
    #[default]
    Token,
    Cookie,
}

/// In-memory session state. The access token is absent after hydration
/// under the cookie-delegated scheme.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub student: Student,
}

/// Single source of truth for "who is logged in" within this process.
///
/// The session is either fully absent or fully populated; `login` replaces
/// it wholesale and `logout` clears it, with durable storage updated in
/// the same call so no reader observes a half-applied transition.
pub struct Session {
    scheme: CredentialScheme,
    store: SessionStore,
    data: Option<SessionData>,
}

impl Session {
    pub fn new(scheme: CredentialScheme, data_dir: PathBuf) -> Self {
        Self {
            scheme,
            store: SessionStore::new(data_dir),
            data: None,
        }
    }

    /// Hydrate in-memory state from the session store.
    ///
    /// Returns true when a complete session was restored. Missing,
    /// malformed, or incomplete stored data leaves the session logged
    /// out; this never fails.
    pub fn initialize(&mut self) -> bool {
        let Some(stored) = self.store.load() else {
            debug!("No stored session");
            self.data = None;
            return false;
        };

        if self.scheme == CredentialScheme::Token && stored.access_token.is_none() {
            warn!("Stored session is missing its access token, treating as logged out");
            self.data = None;
            return false;
        }

        debug!(email = %stored.student.email, "Session restored from storage");
        self.data = Some(SessionData {
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            student: stored.student,
        });
        true
    }

    /// Replace the session wholesale and persist the scheme-applicable
    /// fields. Callers must have validated the credentials against the
    /// server already; no validation happens here, and a storage failure
    /// is logged rather than raised.
    pub fn login(&mut self, access_token: String, refresh_token: String, student: Student) {
        let persisted = PersistedSession {
            access_token: match self.scheme {
                CredentialScheme::Token => Some(access_token.clone()),
                CredentialScheme::Cookie => None,
            },
            refresh_token: refresh_token.clone(),
            student: student.clone(),
        };

        self.data = Some(SessionData {
            access_token: Some(access_token),
            refresh_token,
            student,
        });

        if let Err(e) = self.store.save(&persisted) {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// Clear the session in memory and in the store. Idempotent.
    pub fn logout(&mut self) {
        self.data = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        match self.data {
            Some(ref data) => {
                self.scheme == CredentialScheme::Cookie || data.access_token.is_some()
            }
            None => false,
        }
    }

    /// The bearer token the HTTP layer should attach, if any.
    ///
    /// Always `None` under the cookie-delegated scheme - the client's
    /// cookie store carries the access cookie instead.
    pub fn access_token_for_request(&self) -> Option<&str> {
        match self.scheme {
            CredentialScheme::Token => self.data.as_ref().and_then(|d| d.access_token.as_deref()),
            CredentialScheme::Cookie => None,
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.refresh_token.as_str())
    }

    pub fn student(&self) -> Option<&Student> {
        self.data.as_ref().map(|d| &d.student)
    }

    pub fn scheme(&self) -> CredentialScheme {
        self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, email: &str) -> Student {
        Student {
            id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            major: "Mathematics".to_string(),
            year: 3,
        }
    }

    #[test]
    fn test_initialize_with_empty_store() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        assert!(!session.initialize());
        assert!(!session.is_authenticated());
        assert!(session.student().is_none());
    }

    #[test]
    fn test_hydration_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        session.login(
            "T1".to_string(),
            "R1".to_string(),
            student(1, "a@b.com"),
        );

        // A fresh process hydrates the same state back
        let mut restored = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        assert!(restored.initialize());
        assert!(restored.is_authenticated());
        assert_eq!(restored.access_token_for_request(), Some("T1"));
        assert_eq!(restored.refresh_token(), Some("R1"));
        assert_eq!(restored.student().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_login_replaces_wholesale() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());

        session.login("T1".to_string(), "R1".to_string(), student(1, "a@b.com"));
        session.login("T2".to_string(), "R2".to_string(), student(2, "c@d.com"));

        assert_eq!(session.access_token_for_request(), Some("T2"));
        assert_eq!(session.refresh_token(), Some("R2"));
        assert_eq!(session.student().map(|s| s.email.as_str()), Some("c@d.com"));

        // No residue of the first login in storage either
        let mut restored = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        assert!(restored.initialize());
        assert_eq!(restored.access_token_for_request(), Some("T2"));
        assert_eq!(restored.student().map(|s| s.id), Some(2));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        session.login("T1".to_string(), "R1".to_string(), student(1, "a@b.com"));

        for _ in 0..2 {
            session.logout();
            assert!(!session.is_authenticated());
            assert!(session.access_token_for_request().is_none());
            assert!(session.refresh_token().is_none());
            assert!(session.student().is_none());

            // Durable state is gone too
            let mut restored = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
            assert!(!restored.initialize());
        }
    }

    #[test]
    fn test_malformed_store_hydrates_as_logged_out() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("session.json"), r#"{"refresh_token": 42}"#)
            .expect("Failed to write test file");

        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        assert!(!session.initialize());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_cookie_scheme_never_exposes_request_token() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut session = Session::new(CredentialScheme::Cookie, dir.path().to_path_buf());
        session.login("T1".to_string(), "R1".to_string(), student(1, "a@b.com"));

        assert!(session.is_authenticated());
        // The HTTP layer gets nothing; the cookie carries the credential
        assert!(session.access_token_for_request().is_none());

        // Hydration in the same scheme stays authenticated without one
        let mut restored = Session::new(CredentialScheme::Cookie, dir.path().to_path_buf());
        assert!(restored.initialize());
        assert!(restored.is_authenticated());
        assert!(restored.access_token_for_request().is_none());
        assert_eq!(restored.refresh_token(), Some("R1"));
    }

    #[test]
    fn test_token_scheme_rejects_partial_store() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        // A cookie-scheme process wrote the store (no access token), then
        // the config was switched to the token scheme
        let mut cookie_session = Session::new(CredentialScheme::Cookie, dir.path().to_path_buf());
        cookie_session.login("T1".to_string(), "R1".to_string(), student(1, "a@b.com"));

        let mut token_session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        assert!(!token_session.initialize());
        assert!(!token_session.is_authenticated());
    }

    #[test]
    fn test_login_scenario_persists_refresh_and_subject() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut session = Session::new(CredentialScheme::Token, dir.path().to_path_buf());
        session.login("T1".to_string(), "R1".to_string(), student(1, "a@b.com"));
        assert!(session.is_authenticated());

        let raw = std::fs::read_to_string(dir.path().join("session.json"))
            .expect("Session file should exist");
        assert!(raw.contains("R1"));
        assert!(raw.contains("a@b.com"));
    }
}
