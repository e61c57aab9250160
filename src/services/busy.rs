//! Per-operation busy flags.
//!
//! A kind is busy while a [`BusyToken`] for it is alive. Dropping the token
//! clears the flag, so every exit path of an invocation (success, failure,
//! early return, panic, or the future being dropped) releases it.

#[cfg(test)]
#[path = "busy_test.rs"]
mod busy_test;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wire::Operation;

#[derive(Clone, Default)]
pub struct BusyMap {
    busy: Arc<Mutex<HashSet<Operation>>>,
}

impl BusyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `operation` busy, or return `None` if it already is.
    #[must_use]
    pub fn try_acquire(&self, operation: Operation) -> Option<BusyToken> {
        if !self.lock().insert(operation) {
            return None;
        }
        Some(BusyToken { map: self.clone(), operation })
    }

    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.lock().contains(&operation)
    }

    fn release(&self, operation: Operation) {
        self.lock().remove(&operation);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Operation>> {
        self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds one operation kind busy until dropped.
#[must_use = "the operation is released as soon as the token is dropped"]
pub struct BusyToken {
    map: BusyMap,
    operation: Operation,
}

impl BusyToken {
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for BusyToken {
    fn drop(&mut self) {
        self.map.release(self.operation);
    }
}
