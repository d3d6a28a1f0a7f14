//! Challenge query resolution.
//!
//! Challenge screens arrive with a flat, loosely-typed bag of query
//! parameters. [`resolve`] turns that bag into a canonical
//! [`ChallengeDescriptor`] exactly once per challenge session; every
//! downstream decision (which endpoint, which identifier, whether resend is
//! available) reads the descriptor, never the raw parameters.

use tracing::warn;

/// The closed set of challenge modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeMode {
    /// Email verification code against a flow id.
    Email,
    /// Email-delivered second factor against an MFA token.
    EmailMfa,
    /// Authenticator-app second factor against an MFA token.
    Totp,
    /// Password re-entry against a username.
    Password,
}

impl ChallengeMode {
    /// Parse a `type` parameter value. Anything outside the closed set is
    /// unresolved, not an error.
    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "email" => Some(ChallengeMode::Email),
            "email_mfa" => Some(ChallengeMode::EmailMfa),
            "totp" => Some(ChallengeMode::Totp),
            "password" => Some(ChallengeMode::Password),
            _ => None,
        }
    }

    /// Canonical `type` parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeMode::Email => "email",
            ChallengeMode::EmailMfa => "email_mfa",
            ChallengeMode::Totp => "totp",
            ChallengeMode::Password => "password",
        }
    }

    /// Method tag sent to the backend.
    ///
    /// `email_mfa` is deliberately submitted under the TOTP method: the
    /// backend's session-issuing path is shared across second factors and
    /// distinguishes them by the token itself. Do not "fix" this mapping
    /// without the backend contract changing first.
    pub fn method_tag(&self) -> &'static str {
        match self {
            ChallengeMode::Email => "EMAIL",
            ChallengeMode::EmailMfa | ChallengeMode::Totp => "TOTP",
            ChallengeMode::Password => "PASSWORD",
        }
    }

    /// Query-parameter name carrying the identifier for this mode in
    /// challenge URLs.
    pub fn identifier_param(&self) -> &'static str {
        match self {
            ChallengeMode::Email => "flow_id",
            ChallengeMode::EmailMfa | ChallengeMode::Totp => "token",
            ChallengeMode::Password => "username",
        }
    }

    /// Whether a fresh code can be requested for this mode. Only the
    /// email-delivered modes have something to resend.
    pub fn supports_resend(&self) -> bool {
        matches!(self, ChallengeMode::Email | ChallengeMode::EmailMfa)
    }

    /// Whether the submitted secret is a 6-digit one-time code (as opposed
    /// to a password).
    pub fn expects_otp(&self) -> bool {
        !matches!(self, ChallengeMode::Password)
    }
}

/// The raw parameter bag a challenge screen arrives with.
///
/// Both snake_case and camelCase spellings are accepted when parsing a URL;
/// only the canonical names exist past this point.
#[derive(Debug, Clone, Default)]
pub struct ChallengeQuery {
    /// `type` parameter, unvalidated.
    pub challenge_type: Option<String>,
    /// Flow id for email-code verification.
    pub flow_id: Option<String>,
    /// MFA token (`token` / `mfa_token`).
    pub token: Option<String>,
    /// Privileged action being re-authenticated.
    pub action: Option<String>,
    /// Masked email display hint (`email` / `masked_email`).
    pub masked_email: Option<String>,
    /// Code expiry timestamp (RFC 3339).
    pub expires_at: Option<String>,
    /// Resend cooldown target timestamp (RFC 3339).
    pub next_resend_at: Option<String>,
    /// Caller-supplied post-auth destination (validated later, at use).
    pub redirect_to: Option<String>,
    /// Back-navigation target for abandoning the challenge.
    pub return_to: Option<String>,
    /// Username for password re-entry.
    pub username: Option<String>,
    /// Whether this is a signup verification flow. Explicitly threaded from
    /// the caller, never inferred from response shape.
    pub signup: bool,
}

impl ChallengeQuery {
    /// Parse the query string of a challenge URL into a parameter bag.
    /// Unknown parameters are ignored.
    pub fn from_url(url: &str) -> Self {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        let mut bag = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "type" => bag.challenge_type = Some(value),
                "flow_id" | "flowId" => bag.flow_id = Some(value),
                "token" | "mfa_token" | "mfaToken" => bag.token = Some(value),
                "action" => bag.action = Some(value),
                "email" | "masked_email" | "maskedEmail" => bag.masked_email = Some(value),
                "expires_at" | "expiresAt" => bag.expires_at = Some(value),
                "next_resend_at" | "nextResendAt" => bag.next_resend_at = Some(value),
                "redirect_to" | "redirectTo" => bag.redirect_to = Some(value),
                "return_to" | "returnTo" => bag.return_to = Some(value),
                "username" => bag.username = Some(value),
                "signup" => bag.signup = matches!(value.as_str(), "1" | "true" | "yes"),
                _ => {}
            }
        }

        bag
    }
}

/// Canonical challenge descriptor, resolved once per challenge session.
///
/// The identifier's meaning depends on the mode: a flow id for `email`, an
/// MFA token for `email_mfa`/`totp`, a username for `password`. A successful
/// resend rotates the identifier in place; everything else is fixed for the
/// descriptor's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDescriptor {
    pub mode: ChallengeMode,
    pub identifier: String,
    pub action: Option<String>,
    pub display_email: Option<String>,
    pub expires_at: Option<String>,
    pub next_resend_at: Option<String>,
    pub redirect_to: Option<String>,
    pub return_to: Option<String>,
    pub signup: bool,
}

/// Resolve a parameter bag into a descriptor.
///
/// Fallback order, preserved exactly:
/// 1. `action` present: mode is forced from `type` when it names a non-email
///    mode, else defaults to `email`.
/// 2. `type` names one of the four modes: taken directly.
/// 3. No `type` but a flow id is present: `email` (backward-compatible
///    inference for old emailed links).
/// 4. Otherwise the challenge is unresolvable and `None` is returned —
///    absence of a mode is a value, never an error.
///
/// The identifier is then selected purely from the resolved mode; a bag
/// missing that identifier is also unresolvable.
pub fn resolve(query: &ChallengeQuery) -> Option<ChallengeDescriptor> {
    let explicit = query
        .challenge_type
        .as_deref()
        .and_then(ChallengeMode::from_type);

    let mode = if query.action.is_some() {
        match explicit {
            Some(mode) if mode != ChallengeMode::Email => mode,
            _ => ChallengeMode::Email,
        }
    } else if let Some(mode) = explicit {
        mode
    } else if query.flow_id.is_some() {
        ChallengeMode::Email
    } else {
        warn!("Challenge parameters resolve to no mode");
        return None;
    };

    let identifier = match mode {
        ChallengeMode::Email => query.flow_id.clone(),
        ChallengeMode::EmailMfa | ChallengeMode::Totp => query.token.clone(),
        ChallengeMode::Password => query.username.clone(),
    };
    let Some(identifier) = identifier else {
        warn!(mode = %mode.as_str(), "Challenge mode resolved but its identifier is missing");
        return None;
    };

    Some(ChallengeDescriptor {
        mode,
        identifier,
        action: query.action.clone(),
        display_email: query.masked_email.clone(),
        expires_at: query.expires_at.clone(),
        next_resend_at: query.next_resend_at.clone(),
        redirect_to: query.redirect_to.clone(),
        return_to: query.return_to.clone(),
        signup: query.signup,
    })
}
