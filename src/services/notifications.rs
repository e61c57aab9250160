//! Notification feed: short-lived toasts with a fixed lifecycle.
//!
//! DESIGN
//! ======
//! Each notification is a small state machine:
//!
//! ```text
//! Created --100ms--> Visible --5000ms--> Hiding --300ms--> Removed
//! ```
//!
//! Pushing a notification spawns one timer task that walks it through the
//! phases; deadlines are measured from creation so the phases never drift.
//! Removal detaches the notification from the live set. Nothing cancels or
//! extends a notification once pushed, and there is no depth limit.
//!
//! [`Phase::at`] exposes the same schedule as a pure function of elapsed time.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::Severity;

pub const SETTLE_DELAY: Duration = Duration::from_millis(100);
pub const DISPLAY_DURATION: Duration = Duration::from_millis(5000);
pub const HIDE_TRANSITION: Duration = Duration::from_millis(300);

const EVENT_CAPACITY: usize = 256;

/// Lifecycle position of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Created,
    Visible,
    Hiding,
    Removed,
}

impl Phase {
    /// Phase a notification is in `elapsed` after creation.
    #[must_use]
    pub fn at(elapsed: Duration) -> Self {
        if elapsed < SETTLE_DELAY {
            Self::Created
        } else if elapsed < SETTLE_DELAY + DISPLAY_DURATION {
            Self::Visible
        } else if elapsed < SETTLE_DELAY + DISPLAY_DURATION + HIDE_TRANSITION {
            Self::Hiding
        } else {
            Self::Removed
        }
    }

    /// The following phase and its offset from creation, or `None` once removed.
    #[must_use]
    pub fn next(self) -> Option<(Self, Duration)> {
        match self {
            Self::Created => Some((Self::Visible, SETTLE_DELAY)),
            Self::Visible => Some((Self::Hiding, SETTLE_DELAY + DISPLAY_DURATION)),
            Self::Hiding => Some((Self::Removed, SETTLE_DELAY + DISPLAY_DURATION + HIDE_TRANSITION)),
            Self::Removed => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub id: Uuid,
    pub text: String,
    pub severity: Severity,
    pub created_at: Instant,
    pub phase: Phase,
}

/// Broadcast whenever a notification enters a new phase.
#[derive(Clone, Debug)]
pub struct PhaseChange {
    pub id: Uuid,
    pub phase: Phase,
    pub severity: Severity,
    pub text: String,
}

/// Shared handle to the live notification set.
#[derive(Clone)]
pub struct NotificationFeed {
    live: Arc<Mutex<Vec<Notification>>>,
    events: broadcast::Sender<PhaseChange>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { live: Arc::new(Mutex::new(Vec::new())), events }
    }
}

impl NotificationFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notification and schedule its lifecycle.
    ///
    /// Outside a tokio runtime the notification stays `Created` until
    /// [`NotificationFeed::advance`] moves it.
    pub fn push(&self, severity: Severity, text: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            text: text.into(),
            severity,
            created_at: Instant::now(),
            phase: Phase::Created,
        };
        let id = notification.id;
        let created_at = notification.created_at;
        self.emit(&notification);
        self.lock().push(notification);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let feed = self.clone();
                handle.spawn(async move { feed.drive(id, created_at).await });
            }
            Err(_) => debug!(%id, "no runtime; notification timers not scheduled"),
        }
        id
    }

    /// Move notification `id` to `phase`. Entering [`Phase::Removed`] detaches it.
    pub fn advance(&self, id: Uuid, phase: Phase) {
        let changed = {
            let mut live = self.lock();
            let Some(index) = live.iter().position(|n| n.id == id) else {
                return;
            };
            if phase == Phase::Removed {
                let mut removed = live.remove(index);
                removed.phase = Phase::Removed;
                removed
            } else {
                live[index].phase = phase;
                live[index].clone()
            }
        };
        self.emit(&changed);
    }

    /// Notifications currently on screen.
    #[must_use]
    pub fn visible(&self) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| n.phase == Phase::Visible)
            .cloned()
            .collect()
    }

    /// Every notification not yet removed, in creation order.
    #[must_use]
    pub fn live(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PhaseChange> {
        self.events.subscribe()
    }

    async fn drive(&self, id: Uuid, created_at: Instant) {
        let mut phase = Phase::Created;
        while let Some((next, offset)) = phase.next() {
            tokio::time::sleep_until(created_at + offset).await;
            self.advance(id, next);
            phase = next;
        }
    }

    fn emit(&self, notification: &Notification) {
        // No subscribers is fine; the live set is the source of truth.
        let _ = self.events.send(PhaseChange {
            id: notification.id,
            phase: notification.phase,
            severity: notification.severity,
            text: notification.text.clone(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
