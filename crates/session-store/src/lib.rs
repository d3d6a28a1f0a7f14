//! Session persistence for the Bazaar client.
//!
//! This crate provides:
//! - A storage abstraction (`SecureStorage`) with in-memory and file backends
//! - A high-level `SessionManager` for the persisted login session
//! - The `SessionSink` contract consumed by the challenge orchestrator

mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session::{
    SessionManager, SessionMeta, SessionSink, SessionStatus, SessionUser, StoredSessionSink,
};
pub use traits::SecureStorage;

use client_config_and_utils::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default storage implementation, backed by the session file
/// under the client base directory.
pub fn create_storage(paths: &Paths) -> StorageResult<Box<dyn SecureStorage>> {
    let storage = FileStorage::open(paths.session_file())?;
    Ok(Box::new(storage))
}

/// Create a SessionManager with the default file-backed storage.
pub fn create_session_manager(paths: &Paths) -> StorageResult<SessionManager> {
    let storage = create_storage(paths)?;
    Ok(SessionManager::new(storage))
}
