//! Submission outcome as a tagged union.
//!
//! The backend's verify endpoints return a single polymorphic shape; the
//! API client turns it into a discriminated outcome at the wire boundary,
//! and the controller maps that plus its own side effects into this union.
//! Consumers match exhaustively; nothing downstream inspects optional
//! fields to guess what happened.

use auth_api_client::AuthUser;

/// Outcome of one code submission. Exactly one variant per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Signup email code confirmed; the caller advances to the next signup
    /// step.
    SignupVerified { email: Option<String> },
    /// A further challenge is required; the caller navigates to `url`.
    /// Expected and legitimate, not a failure.
    NextChallenge { url: String },
    /// Session established; the session sink has already been invoked.
    LoginSuccess { user: AuthUser },
    /// Privileged-action re-auth completed. `redirect_url` carries the
    /// appended action token when the backend issued one.
    ActionSuccess { redirect_url: Option<String> },
    /// Recoverable failure, surfaced to the user; the controller is back in
    /// its idle state and another attempt is allowed.
    Error { message: String },
    /// The descriptor matched no known mode. Should not occur after a
    /// successful resolve; defined as a safe fallback.
    Noop,
}

impl SubmissionResult {
    /// True for the variants that end the current challenge screen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionResult::SignupVerified { .. }
                | SubmissionResult::NextChallenge { .. }
                | SubmissionResult::LoginSuccess { .. }
                | SubmissionResult::ActionSuccess { .. }
        )
    }
}
