//! Session state shared by the transport, stores and UI

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// The authenticated identity, as issued by LOGIN/REGISTER
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub username: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            username: Some(username.into()),
        }
    }

    /// A blank token counts as no token
    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Cloneable handle to the process-wide session
///
/// Holds no I/O. Every clone observes the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previously persisted session
    pub fn from_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub fn set(&self, token: impl Into<String>, username: impl Into<String>) {
        *self.write() = Session::new(token, username);
    }

    pub fn clear(&self) {
        *self.write() = Session::default();
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn username(&self) -> Option<String> {
        self.read().username.clone()
    }

    pub fn has_valid_session(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Copy of the current session, for persisting
    pub fn current(&self) -> Session {
        self.read().clone()
    }

    /// The token, or a session error when unauthenticated
    pub fn require_token(&self) -> Result<String> {
        let session = self.read();
        match session.token.as_deref() {
            Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
            _ => Err(Error::no_session()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
