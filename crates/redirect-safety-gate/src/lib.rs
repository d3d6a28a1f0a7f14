//! Open-redirect-safe handling of caller-supplied navigation targets.
//!
//! Every redirect-bearing transition in the challenge flow (initial arrival,
//! post-login push, action-token append, back-navigation) runs its target
//! through this gate. Only same-origin relative paths survive; everything
//! else falls back to [`DEFAULT_DESTINATION`].

use tracing::warn;

/// Where rejected or absent redirect targets fall back to.
pub const DEFAULT_DESTINATION: &str = "/";

/// Validate a caller-supplied post-auth destination.
///
/// Accepts the target only if it is a relative path beginning with a single
/// `/`: protocol-relative (`//host`), backslash-tricked (`/\host`), and
/// absolute URLs (anything with a scheme, including `javascript:`) are all
/// rejected. Returns `None` on rejection; callers fall back to
/// [`DEFAULT_DESTINATION`].
pub fn safe_redirect(target: Option<&str>) -> Option<String> {
    let target = target?.trim();
    if target.is_empty() {
        return None;
    }

    // Anything that parses as an absolute URL has a scheme and can leave
    // the origin.
    if url::Url::parse(target).is_ok() {
        warn!(target = %target, "Rejected absolute redirect target");
        return None;
    }

    if !target.starts_with('/') || target.starts_with("//") || target.starts_with("/\\") {
        warn!(target = %target, "Rejected non-path redirect target");
        return None;
    }

    Some(target.to_string())
}

/// Validated destination, or [`DEFAULT_DESTINATION`] when the target is
/// absent or unsafe.
pub fn safe_redirect_or_default(target: Option<&str>) -> String {
    safe_redirect(target).unwrap_or_else(|| DEFAULT_DESTINATION.to_string())
}

/// Append a validated redirect target to `base` as a `redirect_to` query
/// parameter. Used when constructing every inter-step navigation URL so the
/// destination survives the whole multi-step flow. Unsafe or absent targets
/// append nothing.
pub fn with_redirect(base: &str, target: Option<&str>) -> String {
    match safe_redirect(target) {
        Some(safe) => append_query_param(base, "redirect_to", &safe),
        None => base.to_string(),
    }
}

/// Append an action token as a query parameter, `?` or `&` aware.
pub fn append_action_token(target: &str, token: &str) -> String {
    append_query_param(target, "action_token", token)
}

fn append_query_param(base: &str, key: &str, value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{key}={encoded}")
}
