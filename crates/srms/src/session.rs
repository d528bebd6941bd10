//! Explicit session context with load/login/logout at defined boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("an email address is required to sign in")]
    MissingEmail,
}

/// Backing storage for the one persisted session.
pub trait SessionStore: Send + Sync {
    fn read(&self) -> Result<Option<SessionUser>, SessionError>;
    fn write(&self, user: &SessionUser) -> Result<(), SessionError>;
    fn remove(&self) -> Result<(), SessionError>;
}

/// Session owned by whoever needs it, instead of ambient global state.
pub struct SessionContext<S> {
    store: S,
    current: Option<SessionUser>,
}

impl<S: SessionStore> SessionContext<S> {
    /// Bootstrap from the store. An unreadable record is discarded.
    pub fn load(store: S) -> Result<Self, SessionError> {
        let current = match store.read() {
            Ok(user) => user,
            Err(SessionError::Corrupt(err)) => {
                tracing::warn!(error = %err, "discarding unreadable session");
                store.remove()?;
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Self { store, current })
    }

    pub fn login(&mut self, email: &str, role: Role) -> Result<&SessionUser, SessionError> {
        self.login_at(email, role, Utc::now())
    }

    pub fn login_at(
        &mut self,
        email: &str,
        role: Role,
        login_time: DateTime<Utc>,
    ) -> Result<&SessionUser, SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::MissingEmail);
        }

        let user = SessionUser {
            email: email.to_string(),
            role,
            login_time,
        };
        self.store.write(&user)?;
        tracing::debug!(email = %user.email, role = %user.role, "session started");
        Ok(&*self.current.insert(user))
    }

    pub fn logout(&mut self) -> Result<Option<SessionUser>, SessionError> {
        self.store.remove()?;
        Ok(self.current.take())
    }

    pub fn current(&self) -> Option<&SessionUser> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|user| user.role)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// JSON file store used by the command line.
#[derive(Debug, Clone)]
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

impl SessionStore for FileSessionStore {
    fn read(&self) -> Result<Option<SessionUser>, SessionError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, user: &SessionUser) -> Result<(), SessionError> {
        let body = serde_json::to_vec_pretty(user)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<SessionUser>>,
}

impl MemorySessionStore {
    pub fn with_user(user: SessionUser) -> Self {
        Self {
            inner: Mutex::new(Some(user)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Result<Option<SessionUser>, SessionError> {
        Ok(self.inner.lock().expect("lock poisoned").clone())
    }

    fn write(&self, user: &SessionUser) -> Result<(), SessionError> {
        *self.inner.lock().expect("lock poisoned") = Some(user.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        self.inner.lock().expect("lock poisoned").take();
        Ok(())
    }
}
