//! Operations the shell started and has not yet seen finish.
//!
//! DESIGN
//! ======
//! The shell hands each dispatch to a task so the prompt stays responsive.
//! Those tasks are owned here rather than detached: finished ones are reaped
//! between commands, and [`OperationJobs::drain`] waits for the rest before
//! the shell returns. An operation started in the shell therefore always
//! reaches the log with its outcome, even when the user quits right after.

#[cfg(test)]
#[path = "jobs_test.rs"]
mod jobs_test;

use std::future::Future;

use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use super::dispatch::DispatchStatus;

#[derive(Default)]
pub struct OperationJobs {
    set: JoinSet<DispatchStatus>,
}

impl OperationJobs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` in the background; its status is collected by [`reap`](Self::reap) or [`drain`](Self::drain).
    pub fn spawn<F>(&mut self, job: F)
    where
        F: Future<Output = DispatchStatus> + Send + 'static,
    {
        self.set.spawn(job);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Collect the jobs that have already finished, without waiting.
    pub fn reap(&mut self) -> Vec<DispatchStatus> {
        let mut finished = Vec::new();
        while let Some(joined) = self.set.try_join_next() {
            finished.extend(settle(joined));
        }
        finished
    }

    /// Wait for every outstanding job.
    pub async fn drain(&mut self) -> Vec<DispatchStatus> {
        if !self.set.is_empty() {
            info!(pending = self.set.len(), "jobs: waiting for running operations");
        }
        let mut finished = Vec::new();
        while let Some(joined) = self.set.join_next().await {
            finished.extend(settle(joined));
        }
        finished
    }
}

fn settle(joined: Result<DispatchStatus, JoinError>) -> Option<DispatchStatus> {
    match joined {
        Ok(status) => Some(status),
        Err(err) => {
            warn!(error = %err, "jobs: operation task ended abnormally");
            None
        }
    }
}
