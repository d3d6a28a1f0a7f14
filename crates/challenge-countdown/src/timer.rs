//! Self-stopping one-second countdown timer.

use crate::{seconds_remaining, Clock, Remaining};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// A live countdown over a single target timestamp.
///
/// Recomputes the remaining seconds from the clock on a one-second cadence
/// and publishes changes on a watch channel. The task stops itself once the
/// countdown reaches zero (or when there is no target); it does not restart
/// without a new `start`. Dropping the timer aborts the task, tying its
/// lifetime to the owning challenge controller.
pub struct CountdownTimer {
    rx: watch::Receiver<Remaining>,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Start a countdown toward `target` (RFC 3339, or `None` for no
    /// countdown).
    pub fn start<C: Clock + 'static>(clock: Arc<C>, target: Option<String>) -> Self {
        let initial = seconds_remaining(target.as_deref(), clock.now());
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            if !initial.is_running() {
                return;
            }

            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // First tick completes immediately; skip it so ticks land on
            // whole-second boundaries after start.
            interval.tick().await;

            loop {
                interval.tick().await;
                let remaining = seconds_remaining(target.as_deref(), clock.now());
                if tx.send(remaining).is_err() {
                    return;
                }
                if !remaining.is_running() {
                    debug!("Countdown reached zero, stopping");
                    return;
                }
            }
        });

        Self { rx, task }
    }

    /// Current remaining value.
    pub fn remaining(&self) -> Remaining {
        *self.rx.borrow()
    }

    /// Subscribe to remaining-value changes.
    pub fn subscribe(&self) -> watch::Receiver<Remaining> {
        self.rx.clone()
    }

    /// Whether the ticking task has stopped.
    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
