//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Logged-in user payload (JSON)
    pub const SESSION_USER: &'static str = "session_user";

    /// Session metadata (JSON)
    pub const SESSION_META: &'static str = "session_meta";
}
