//! Persisted sign-in state
//!
//! The session file is a small JSON object with fixed `token` and `username`
//! keys. A missing or unreadable file simply means nobody is signed in.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::models::Session;

/// Shared handle to the current session.
///
/// Clones share the same state, so the handle held by the API client sees a
/// login performed through any other clone.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Open the store backed by `path`, loading any session saved there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = read_session_file(&path);
        if current.is_some() {
            debug!("Loaded session from {}", path.display());
        }
        Self {
            path: Some(path),
            current: Arc::new(RwLock::new(current)),
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Current bearer token, if signed in
    pub fn token(&self) -> Option<String> {
        self.get().map(|session| session.token)
    }

    /// Current username, if signed in
    pub fn username(&self) -> Option<String> {
        self.get().map(|session| session.username)
    }

    pub fn get(&self) -> Option<Session> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.get().is_some()
    }

    /// Persist a new session and make it current
    pub fn save(&self, session: Session) -> Result<(), ApiError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&session)?;
            std::fs::write(path, json)?;
            debug!("Saved session for {} to {}", session.username, path.display());
        }
        self.replace(Some(session));
        Ok(())
    }

    /// Forget the current session and remove the file
    pub fn clear(&self) -> Result<(), ApiError> {
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.replace(None);
        Ok(())
    }

    fn replace(&self, session: Option<Session>) {
        match self.current.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

fn read_session_file(path: &Path) -> Option<Session> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Session>(&content) {
        Ok(session) if !session.token.is_empty() => Some(session),
        Ok(_) => None,
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}
