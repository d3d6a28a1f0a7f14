//! Auth API error types.

use thiserror::Error;

/// Error code the backend uses when a flow has exhausted its resends.
pub const RESEND_LIMIT_CODE: &str = "RESEND_LIMIT_EXCEEDED";

/// Auth API error type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend rejected the request (wrong code, expired flow, ...).
    /// Carries the human-readable message extracted from the error body.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Session is no longer valid (401 from any call).
    #[error("Unauthorized")]
    Unauthorized,

    /// The flow has exhausted its resend allowance. Terminal for the flow.
    #[error("Resend limit exceeded")]
    ResendLimitExceeded,

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Human-readable message for surfacing in the UI. Transport and decode
    /// failures are normalized here so every caller shows the same text for
    /// the same failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::ResendLimitExceeded => {
                "Too many codes requested. Please start over.".to_string()
            }
            ApiError::Http(e) if e.is_connect() || e.is_timeout() => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shape the backend uses for rejections.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "code")]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract a human-readable message from an error response body, falling
/// back to the raw body, then to the status code.
pub(crate) fn extract_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
        if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
            return error;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed (HTTP {status})")
    } else {
        trimmed.to_string()
    }
}

/// Check whether an error body carries the distinguished resend-limit code.
pub(crate) fn is_resend_limit(body: &str) -> bool {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .is_some_and(|code| code == RESEND_LIMIT_CODE)
}
