//! Authentication module for managing the logged-in session.
//!
//! This module provides:
//! - `Session`: the in-process session manager, reconciled with durable
//!   storage on startup and on every login/logout transition
//! - `SessionStore`: the JSON-file-backed persisted session store
//! - `CredentialStore`: optional OS-keychain password storage for the
//!   interactive login paths
//!
//! Where the access token lives is an explicit configuration choice, see
//! [`CredentialScheme`].

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::CredentialStore;
pub use session::{CredentialScheme, Session, SessionData};
pub use store::{PersistedSession, SessionStore};
