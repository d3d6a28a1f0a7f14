//! Navigation seam.

/// Sink for the relative URLs the challenge flow navigates to.
///
/// Every target handed to `navigate` has already been through the redirect
/// safety gate or was built from a fixed path; implementations perform the
/// actual screen transition (or record it, in tests).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
