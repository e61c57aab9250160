//! Time-of-day display, refreshed once a second.
//!
//! Same shape as the telemetry poller: an interval task publishing into a
//! `watch` channel and stopping once every receiver is gone.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::util::format::{clock_time, now_local};

pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

pub struct Clock;

impl Clock {
    /// Wall clock in the local offset, ticking every [`CLOCK_INTERVAL`].
    #[must_use]
    pub fn spawn() -> (JoinHandle<()>, watch::Receiver<String>) {
        Self::spawn_with(CLOCK_INTERVAL, now_local)
    }

    /// Publish `HH:MM:SS` of `now()` on every tick, starting immediately.
    /// Receivers only see a change when the rendered time differs.
    pub fn spawn_with<F>(every: Duration, now: F) -> (JoinHandle<()>, watch::Receiver<String>)
    where
        F: Fn() -> OffsetDateTime + Send + 'static,
    {
        let (tx, rx) = watch::channel(clock_time(now()));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = tx.closed() => break,
                }
                let current = clock_time(now());
                tx.send_if_modified(|shown| {
                    if *shown == current {
                        return false;
                    }
                    shown.clone_from(&current);
                    true
                });
            }
            debug!("clock: all receivers dropped, stopping");
        });
        (handle, rx)
    }
}

/// OSC 2 sequence setting the terminal window title.
#[must_use]
pub fn title_sequence(title: &str) -> String {
    format!("\x1b]2;{title}\x07")
}
