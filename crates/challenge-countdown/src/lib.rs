//! Countdown timers for challenge expiry and resend cooldown.
//!
//! Each active challenge runs two independent countdowns: one for code
//! expiry (informational only) and one for the resend cooldown (blocks the
//! resend coordinator while above zero). Remaining time is always recomputed
//! from the wall clock rather than decremented, so a suspended tab or a
//! stalled event loop cannot leave the display drifted.

mod clock;
mod timer;

pub use clock::{Clock, SystemClock};
pub use timer::CountdownTimer;

use chrono::{DateTime, Utc};
use tracing::warn;

/// Remaining time on a countdown.
///
/// `NotApplicable` (no target configured) is distinct from `Seconds(0)`
/// (target reached): a challenge without a cooldown may resend immediately,
/// while an expired countdown means the window has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    /// No countdown configured.
    NotApplicable,
    /// Whole seconds until the target; zero once reached.
    Seconds(u64),
}

impl Remaining {
    /// True once a configured countdown has reached zero.
    pub fn is_elapsed(&self) -> bool {
        matches!(self, Remaining::Seconds(0))
    }

    /// True while a configured countdown is still running.
    pub fn is_running(&self) -> bool {
        matches!(self, Remaining::Seconds(n) if *n > 0)
    }
}

/// Compute the remaining whole seconds until `target` at instant `now`:
/// `max(0, floor((target - now) / 1000))`.
///
/// A missing target yields `NotApplicable`. An unparseable target is treated
/// the same way (and logged); the challenge flow never fails on bad display
/// metadata.
pub fn seconds_remaining(target: Option<&str>, now: DateTime<Utc>) -> Remaining {
    let Some(raw) = target else {
        return Remaining::NotApplicable;
    };

    let target = match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            warn!(target = %raw, error = %e, "Unparseable countdown target, ignoring");
            return Remaining::NotApplicable;
        }
    };

    let millis = target.signed_duration_since(now).num_milliseconds();
    if millis <= 0 {
        Remaining::Seconds(0)
    } else {
        Remaining::Seconds((millis / 1000) as u64)
    }
}
