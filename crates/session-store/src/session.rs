//! High-level API for the persisted login session.

use crate::{SecureStorage, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// User payload persisted after a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID from the auth API
    pub id: String,
    /// User email
    #[serde(default)]
    pub email: Option<String>,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
}

/// Session metadata persisted alongside the user payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    /// When the session was established (ISO timestamp)
    pub logged_in_at: String,
    /// When the session expires, if the backend reported one (ISO timestamp)
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Current session status.
#[derive(Debug, Clone)]
pub enum SessionStatus {
    /// Logged in with a live session.
    LoggedIn {
        user_id: String,
        expires_at: Option<String>,
    },
    /// Not logged in.
    NotLoggedIn,
    /// A session exists but its expiry has passed.
    Expired,
}

/// High-level API for storing and retrieving the login session.
pub struct SessionManager {
    storage: Box<dyn SecureStorage>,
}

impl SessionManager {
    /// Create a new session manager with the given storage backend
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// Store the complete session (user + metadata).
    pub fn set_session(&self, user: &SessionUser, expires_at: Option<&str>) -> StorageResult<()> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION_USER, &user_json)?;

        let meta = SessionMeta {
            logged_in_at: chrono::Utc::now().to_rfc3339(),
            expires_at: expires_at.map(String::from),
        };
        let meta_json = serde_json::to_string(&meta)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION_META, &meta_json)
    }

    /// Retrieve the persisted user payload.
    pub fn get_user(&self) -> StorageResult<Option<SessionUser>> {
        match self.storage.get(StorageKeys::SESSION_USER)? {
            Some(json) => {
                let user: SessionUser = serde_json::from_str(&json)
                    .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Retrieve session metadata.
    pub fn get_meta(&self) -> StorageResult<Option<SessionMeta>> {
        match self.storage.get(StorageKeys::SESSION_META)? {
            Some(json) => {
                let meta: SessionMeta = serde_json::from_str(&json)
                    .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Check if a session exists
    pub fn has_session(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::SESSION_USER)
    }

    /// Check if the session is expired. Sessions without a reported expiry
    /// never expire locally.
    pub fn is_expired(&self) -> StorageResult<bool> {
        match self.get_meta()? {
            Some(SessionMeta {
                expires_at: Some(expires_at),
                ..
            }) => {
                let expires_at = chrono::DateTime::parse_from_rfc3339(&expires_at)
                    .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
                Ok(expires_at.signed_duration_since(chrono::Utc::now()).num_seconds() <= 0)
            }
            Some(_) => Ok(false),
            None => Ok(true),
        }
    }

    /// Get the current session status.
    pub fn status(&self) -> StorageResult<SessionStatus> {
        if !self.has_session()? {
            return Ok(SessionStatus::NotLoggedIn);
        }

        let user = match self.get_user()? {
            Some(u) => u,
            None => return Ok(SessionStatus::NotLoggedIn),
        };

        if self.is_expired()? {
            return Ok(SessionStatus::Expired);
        }

        let expires_at = self.get_meta()?.and_then(|m| m.expires_at);
        Ok(SessionStatus::LoggedIn {
            user_id: user.id,
            expires_at,
        })
    }

    /// Clear the session. Individual delete failures are ignored so a partial
    /// session cannot survive.
    pub fn clear_session(&self) -> StorageResult<()> {
        let _ = self.storage.delete(StorageKeys::SESSION_USER);
        let _ = self.storage.delete(StorageKeys::SESSION_META);
        Ok(())
    }
}

/// The contract the challenge orchestrator calls on terminal verification
/// success. Persistence mechanics live behind it.
pub trait SessionSink: Send + Sync {
    /// Persist the user and mark the client authenticated.
    fn login(&self, user: &SessionUser) -> StorageResult<()>;

    /// Clear the persisted session. Implementations may additionally revoke
    /// the session server-side, but must never let that block or fail the
    /// local clear.
    fn logout(&self) -> StorageResult<()>;
}

/// Storage-backed `SessionSink`.
pub struct StoredSessionSink {
    manager: SessionManager,
}

impl StoredSessionSink {
    /// Wrap a session manager.
    pub fn new(manager: SessionManager) -> Self {
        Self { manager }
    }

    /// Access the underlying manager.
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }
}

impl SessionSink for StoredSessionSink {
    fn login(&self, user: &SessionUser) -> StorageResult<()> {
        self.manager.set_session(user, None)?;
        info!(user_id = %user.id, "Session established");
        Ok(())
    }

    fn logout(&self) -> StorageResult<()> {
        self.manager.clear_session()?;
        info!("Session cleared");
        Ok(())
    }
}
