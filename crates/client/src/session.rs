//! Reviewer sign-in. The username is checked against the registry once, then
//! persisted so later invocations act as the same reviewer until logout.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use abmdesk_core::domain::session::Session;

use crate::clock::Clock;
use crate::errors::SessionError;
use crate::gateway::DashboardApi;

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    username: String,
    established_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, error: impl std::fmt::Display) -> SessionError {
    SessionError::Storage(format!("{}: {error}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(storage_error(&self.path, error)),
        };
        let stored: StoredSession =
            serde_json::from_str(&raw).map_err(|error| storage_error(&self.path, error))?;
        Ok(Some(Session::new(&stored.username, stored.established_at)?))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| storage_error(parent, error))?;
        }
        let stored = StoredSession {
            username: session.username().to_string(),
            established_at: session.established_at(),
        };
        let raw = serde_json::to_string_pretty(&stored)
            .map_err(|error| storage_error(&self.path, error))?;
        fs::write(&self.path, raw).map_err(|error| storage_error(&self.path, error))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(storage_error(&self.path, error)),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

pub struct SessionGate {
    api: Arc<dyn DashboardApi>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl SessionGate {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { api, store, clock }
    }

    /// Blank usernames fail before any network call. A failed check keeps any
    /// previous session untouched.
    pub async fn login(&self, username: &str) -> Result<Session, SessionError> {
        let session = Session::new(username, self.clock.now())?;
        let found = self.api.check_user(session.username()).await.map_err(|error| {
            warn!(
                event_name = "session.login.check_failed",
                username = session.username(),
                error = %error,
                "reviewer check failed"
            );
            error
        })?;
        if !found {
            info!(
                event_name = "session.login.rejected",
                username = session.username(),
                "unknown reviewer"
            );
            return Err(SessionError::UnknownUser(session.username().to_string()));
        }

        self.store.save(&session)?;
        info!(event_name = "session.login.accepted", username = session.username(), "reviewer signed in");
        Ok(session)
    }

    pub fn current(&self) -> Result<Session, SessionError> {
        self.store.load()?.ok_or(SessionError::NotLoggedIn)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        info!(event_name = "session.logout", "reviewer signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use abmdesk_core::errors::ValidationError;

    use super::{FileSessionStore, MemorySessionStore, SessionGate, SessionStore};
    use crate::errors::SessionError;
    use crate::testing::{created_at, FixedClock, ScriptedApi};

    fn gate(store: Arc<dyn SessionStore>) -> SessionGate {
        let api = ScriptedApi { reviewers: vec!["abm.meera".to_string()], ..ScriptedApi::default() };
        SessionGate::new(Arc::new(api), store, Arc::new(FixedClock(created_at())))
    }

    #[tokio::test]
    async fn login_persists_trimmed_username() {
        let store = Arc::new(MemorySessionStore::default());
        let gate = gate(store.clone());

        let session = gate.login("  abm.meera ").await.expect("login");

        assert_eq!(session.username(), "abm.meera");
        assert_eq!(gate.current().expect("current").username(), "abm.meera");
    }

    #[tokio::test]
    async fn blank_username_fails_validation() {
        let gate = gate(Arc::new(MemorySessionStore::default()));

        let error = gate.login("   ").await.expect_err("blank");

        assert!(matches!(error, SessionError::Validation(ValidationError::MissingUsername)));
    }

    #[tokio::test]
    async fn unknown_user_keeps_previous_session() {
        let store = Arc::new(MemorySessionStore::default());
        let gate = gate(store.clone());
        gate.login("abm.meera").await.expect("login");

        let error = gate.login("abm.nobody").await.expect_err("unknown");

        assert!(matches!(error, SessionError::UnknownUser(ref name) if name == "abm.nobody"));
        assert_eq!(gate.current().expect("current").username(), "abm.meera");
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let gate = gate(Arc::new(MemorySessionStore::default()));
        gate.login("abm.meera").await.expect("login");

        gate.logout().expect("logout");

        assert!(matches!(gate.current(), Err(SessionError::NotLoggedIn)));
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("nested").join("session"));
        assert!(store.load().expect("empty load").is_none());

        let session = abmdesk_core::domain::session::Session::new("abm.rahul", created_at())
            .expect("session");
        store.save(&session).expect("save");
        assert_eq!(store.load().expect("load"), Some(session));

        store.clear().expect("clear");
        store.clear().expect("clear twice");
        assert!(store.load().expect("load after clear").is_none());
    }

    #[test]
    fn file_store_rejects_blank_stored_username() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session");
        std::fs::write(&path, r#"{"username":"  ","established_at":"2026-10-12T09:00:00Z"}"#)
            .expect("write");

        let error = FileSessionStore::new(path).load().expect_err("blank");

        assert!(matches!(error, SessionError::Validation(ValidationError::MissingUsername)));
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session");
        std::fs::write(&path, "not json").expect("write");

        let error = FileSessionStore::new(path).load().expect_err("corrupt");

        assert!(matches!(error, SessionError::Storage(_)));
    }
}
