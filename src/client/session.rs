//! Session context
//!
//! The signed-in user and their token, held in one explicit object that is
//! handed to the API client. Optionally persisted to a JSON file so a
//! restart keeps the user signed in.
//!
//! Hooks registered with `on_invalidate` run when the session ends, either
//! by an explicit logout or because the server answered 401. A UI uses
//! that to send the user back to the login screen.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::authz::Actor;
use crate::shared::models::{AuthPayload, Role};

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    /// Session from a register/login response
    pub fn from_auth(payload: &AuthPayload) -> Self {
        Self {
            token: payload.token.clone(),
            user_id: payload.user.id.clone(),
            name: payload.user.name.clone(),
            role: payload.user.role,
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    Logout,
    /// The server rejected the token
    Unauthorized,
}

/// Session persistence errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

type InvalidationHook = Arc<dyn Fn(InvalidationReason) + Send + Sync>;

/// Shared, cloneable handle to the current session
#[derive(Clone, Default)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Session>>>,
    hooks: Arc<Mutex<Vec<InvalidationHook>>>,
    store: Option<PathBuf>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("signed_in", &self.is_authenticated())
            .field("store", &self.store)
            .finish()
    }
}

impl SessionContext {
    /// In-memory session, lost on exit
    pub fn new() -> Self {
        Self::default()
    }

    /// Session persisted to `path`
    ///
    /// An existing file is loaded. A file that does not decode is ignored
    /// with a warning and the context starts signed out.
    pub fn with_file(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let restored = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Session>(&contents) {
                Ok(session) => {
                    tracing::info!("Restored session for {}", session.name);
                    Some(session)
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Err(SessionError::Io { path, source }),
        };

        Ok(Self {
            current: Arc::new(RwLock::new(restored)),
            hooks: Arc::default(),
            store: Some(path),
        })
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.token.clone())
    }

    pub fn actor(&self) -> Option<Actor> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Session::actor)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Start (or replace) the session
    pub fn establish(&self, session: Session) {
        tracing::info!("Signed in as {} ({})", session.name, session.role);
        self.persist(Some(&session));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Change the display name of the current session
    pub fn rename(&self, name: &str) {
        let updated = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            match guard.as_mut() {
                Some(session) => {
                    session.name = name.to_string();
                    Some(session.clone())
                }
                None => None,
            }
        };
        if let Some(session) = updated {
            self.persist(Some(&session));
        }
    }

    /// End the session on request
    pub fn logout(&self) {
        if self.clear() {
            tracing::info!("Signed out");
        }
        self.fire(InvalidationReason::Logout);
    }

    /// End the session because the server rejected the token
    ///
    /// Hooks only run when there was a session to end. Returns whether one
    /// was ended.
    pub fn invalidate_unauthorized(&self) -> bool {
        if !self.clear() {
            return false;
        }
        tracing::warn!("Session rejected by server, signing out");
        self.fire(InvalidationReason::Unauthorized);
        true
    }

    /// Run `hook` whenever the session ends
    pub fn on_invalidate<F>(&self, hook: F)
    where
        F: Fn(InvalidationReason) + Send + Sync + 'static,
    {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    fn clear(&self) -> bool {
        let had_session = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        self.persist(None);
        had_session
    }

    fn fire(&self, reason: InvalidationReason) {
        // Snapshot the hooks so one of them may register another.
        let hooks: Vec<InvalidationHook> = self
            .hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for hook in hooks {
            hook(reason);
        }
    }

    /// Write the session file, or remove it for `None`
    ///
    /// Failures are logged; the in-memory session stays authoritative.
    fn persist(&self, session: Option<&Session>) {
        let Some(path) = &self.store else {
            return;
        };
        if let Err(e) = write_session_file(path, session) {
            tracing::warn!("Could not update session file: {}", e);
        }
    }
}

fn write_session_file(path: &Path, session: Option<&Session>) -> Result<(), SessionError> {
    let io_error = |source: io::Error| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };
    match session {
        Some(session) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
            let contents = serde_json::to_string_pretty(session)?;
            fs::write(path, contents).map_err(io_error)
        }
        None => match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error(e)),
            _ => Ok(()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> Session {
        Session {
            token: "token-1".to_string(),
            user_id: "u1".to_string(),
            name: "Ada".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_establish_and_logout() {
        let context = SessionContext::new();
        assert!(!context.is_authenticated());

        context.establish(session());
        assert_eq!(context.token().as_deref(), Some("token-1"));
        assert_eq!(context.actor(), Some(Actor::new("u1", Role::User)));

        context.logout();
        assert!(context.current().is_none());
    }

    #[test]
    fn test_unauthorized_fires_hooks_only_with_session() {
        let context = SessionContext::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        context.on_invalidate(move |reason| {
            assert_eq!(reason, InvalidationReason::Unauthorized);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!context.invalidate_unauthorized());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        context.establish(session());
        assert!(context.invalidate_unauthorized());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!context.is_authenticated());
    }

    #[test]
    fn test_session_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let first = SessionContext::with_file(&path).unwrap();
        first.establish(session());
        first.rename("Ada L.");

        let reloaded = SessionContext::with_file(&path).unwrap();
        let restored = reloaded.current().unwrap();
        assert_eq!(restored.name, "Ada L.");
        assert_eq!(restored.token, "token-1");

        reloaded.logout();
        assert!(!path.exists());
        assert!(SessionContext::with_file(&path).unwrap().current().is_none());
    }

    #[test]
    fn test_corrupt_session_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let context = SessionContext::with_file(&path).unwrap();
        assert!(!context.is_authenticated());
    }
}
