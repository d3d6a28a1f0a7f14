//! Wire types and the tagged unions built from them.
//!
//! The backend's login/verify endpoints return one response shape whose
//! meaning depends on which optional fields are populated. `RawLoginResponse`
//! is that shape; `LoginOutcome` is what the rest of the client sees.
//! Snake/camel spelling variance (`flow_id` vs `flowId`) is folded here via
//! serde aliases and never leaks past this module.

use serde::{Deserialize, Serialize};

/// Authenticated user as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID
    pub id: String,
    /// User email
    #[serde(default)]
    pub email: Option<String>,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
}

/// Status value the backend sets when a second factor is still required.
pub(crate) const STATUS_MFA_REQUIRED: &str = "MFA_REQUIRED";

/// Raw verify-login / password-login response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawLoginResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub require_verification: bool,
    #[serde(default, alias = "flowId")]
    pub flow_id: Option<String>,
    #[serde(default, alias = "maskedEmail")]
    pub masked_email: Option<String>,
    #[serde(default, alias = "mfaToken")]
    pub mfa_token: Option<String>,
    #[serde(default, alias = "mfaType")]
    pub mfa_type: Option<String>,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<String>,
    #[serde(default, alias = "nextResendAt")]
    pub next_resend_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a login-family call actually meant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials/code accepted; a session may be established.
    Authenticated { user: AuthUser },
    /// A second factor is required before the session can be issued.
    MfaRequired {
        mfa_type: String,
        mfa_token: String,
        masked_email: Option<String>,
        expires_at: Option<String>,
        next_resend_at: Option<String>,
    },
    /// A further email-code verification is required (fresh flow id).
    VerificationRequired {
        flow_id: String,
        masked_email: Option<String>,
        expires_at: Option<String>,
        next_resend_at: Option<String>,
    },
    /// The backend accepted the request but rejected the credentials/code.
    Rejected { message: String },
}

impl From<RawLoginResponse> for LoginOutcome {
    fn from(raw: RawLoginResponse) -> Self {
        if let Some(user) = raw.user {
            return LoginOutcome::Authenticated { user };
        }

        let mfa_flagged = raw.status.as_deref() == Some(STATUS_MFA_REQUIRED);
        if let Some(mfa_token) = raw.mfa_token {
            if mfa_flagged || raw.mfa_type.is_some() {
                return LoginOutcome::MfaRequired {
                    mfa_type: raw.mfa_type.unwrap_or_else(|| "totp".to_string()),
                    mfa_token,
                    masked_email: raw.masked_email,
                    expires_at: raw.expires_at,
                    next_resend_at: raw.next_resend_at,
                };
            }
        }

        if raw.require_verification {
            if let Some(flow_id) = raw.flow_id {
                return LoginOutcome::VerificationRequired {
                    flow_id,
                    masked_email: raw.masked_email,
                    expires_at: raw.expires_at,
                    next_resend_at: raw.next_resend_at,
                };
            }
        }

        LoginOutcome::Rejected {
            message: raw
                .message
                .unwrap_or_else(|| "Invalid credentials".to_string()),
        }
    }
}

/// Successful privileged-action re-authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionVerification {
    /// Whether the re-authentication was accepted.
    pub success: bool,
    /// Short-lived proof of fresh re-authentication.
    #[serde(default, alias = "actionToken")]
    pub action_token: Option<String>,
    /// The user the action was verified for.
    #[serde(default)]
    pub user: Option<AuthUser>,
    /// The action that was re-authenticated.
    #[serde(default)]
    pub action: Option<String>,
}

/// Signup email-code verification result.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupVerification {
    /// Whether the code matched.
    pub verified: bool,
    /// The email the flow was verifying, when the backend echoes it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful resend: the flow has been rotated.
#[derive(Debug, Clone, Deserialize)]
pub struct ResendRotation {
    /// Fresh flow id; the previous one is dead.
    #[serde(alias = "flowId")]
    pub flow_id: String,
    /// New code expiry (ISO timestamp).
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<String>,
    /// New resend cooldown target (ISO timestamp).
    #[serde(default, alias = "nextResendAt")]
    pub next_resend_at: Option<String>,
    /// Transient success message for the UI.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawLoginResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_wins_over_everything() {
        let outcome = LoginOutcome::from(raw(
            r#"{"status": "ok", "user": {"id": "u1"}, "require_verification": true, "flow_id": "f1"}"#,
        ));
        match outcome {
            LoginOutcome::Authenticated { user } => assert_eq!(user.id, "u1"),
            other => panic!("Expected Authenticated, got {other:?}"),
        }
    }

    #[test]
    fn test_mfa_required() {
        let outcome = LoginOutcome::from(raw(
            r#"{"status": "MFA_REQUIRED", "mfa_token": "tok", "mfa_type": "totp", "masked_email": "s***@example.com"}"#,
        ));
        match outcome {
            LoginOutcome::MfaRequired {
                mfa_type,
                mfa_token,
                masked_email,
                ..
            } => {
                assert_eq!(mfa_type, "totp");
                assert_eq!(mfa_token, "tok");
                assert_eq!(masked_email.as_deref(), Some("s***@example.com"));
            }
            other => panic!("Expected MfaRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_camel_case_aliases_fold() {
        let outcome = LoginOutcome::from(raw(
            r#"{"require_verification": true, "flowId": "f2", "maskedEmail": "a***@b.c"}"#,
        ));
        match outcome {
            LoginOutcome::VerificationRequired {
                flow_id,
                masked_email,
                ..
            } => {
                assert_eq!(flow_id, "f2");
                assert_eq!(masked_email.as_deref(), Some("a***@b.c"));
            }
            other => panic!("Expected VerificationRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_rejection() {
        let outcome = LoginOutcome::from(raw(r#"{"status": "rejected"}"#));
        match outcome {
            LoginOutcome::Rejected { message } => assert_eq!(message, "Invalid credentials"),
            other => panic!("Expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_require_verification_without_flow_id_is_rejection() {
        let outcome =
            LoginOutcome::from(raw(r#"{"require_verification": true, "message": "odd"}"#));
        assert!(matches!(outcome, LoginOutcome::Rejected { .. }));
    }

    #[test]
    fn test_resend_rotation_aliases() {
        let rotation: ResendRotation = serde_json::from_str(
            r#"{"flowId": "f3", "expiresAt": "2026-01-01T00:00:00Z", "nextResendAt": "2026-01-01T00:01:00Z"}"#,
        )
        .unwrap();
        assert_eq!(rotation.flow_id, "f3");
        assert!(rotation.expires_at.is_some());
        assert!(rotation.next_resend_at.is_some());
    }
}
