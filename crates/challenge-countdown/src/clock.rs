//! Injectable wall clock.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time. All countdown math goes through
/// this so timed behavior is deterministic under test.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
