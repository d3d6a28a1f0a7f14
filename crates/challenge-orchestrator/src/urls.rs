//! Construction of inter-step navigation URLs.
//!
//! Every transition between challenge steps is expressed as a relative URL;
//! the parameter names and the mode set are a stable contract shared with
//! emailed links and the web frontend. The masked-email display hint rides
//! in the URL itself so no ambient state has to survive the navigation.

use crate::descriptor::ChallengeMode;
use redirect_safety_gate::with_redirect;

/// Path every challenge screen lives under.
pub const CHALLENGE_PATH: &str = "/challenge";

/// Login entry point; where dead flows are sent back to.
pub const LOGIN_PATH: &str = "/login";

/// Build the URL for a chained challenge, carrying forward everything the
/// next screen needs: mode, identifier (under the mode's parameter name),
/// display hint, both countdown targets, and the caller's redirect target
/// (appended only if it passes the safety gate).
pub fn next_challenge_url(
    mode: ChallengeMode,
    identifier: &str,
    masked_email: Option<&str>,
    expires_at: Option<&str>,
    next_resend_at: Option<&str>,
    redirect_to: Option<&str>,
) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("type", mode.as_str());
    query.append_pair(mode.identifier_param(), identifier);
    if let Some(email) = masked_email {
        query.append_pair("masked_email", email);
    }
    if let Some(at) = expires_at {
        query.append_pair("expires_at", at);
    }
    if let Some(at) = next_resend_at {
        query.append_pair("next_resend_at", at);
    }

    let base = format!("{CHALLENGE_PATH}?{}", query.finish());
    with_redirect(&base, redirect_to)
}
