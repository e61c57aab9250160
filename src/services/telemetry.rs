//! Telemetry poller: background refresh of the service's aggregate counters.
//!
//! DESIGN
//! ======
//! One task issues the system-info query on a fixed interval and publishes the
//! two counters on a `watch` channel. The first poll fires immediately; missed
//! ticks are delayed rather than bursted. Failures keep the last published
//! value and go to `tracing` only, never to the notification feed or the log.
//! The task stops once every receiver has been dropped.

#[cfg(test)]
#[path = "telemetry_test.rs"]
mod telemetry_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use wire::{Operation, Outcome, Report};

use crate::remote::{RemoteClient, RemoteError, RemoteRequest};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetryCounters {
    pub stored_hashes: u64,
    pub backup_files: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("service reported failure: {0}")]
    Application(String),
    #[error("reply did not carry system information")]
    UnexpectedReply,
}

/// Issue one system-info query.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the call fails or the reply is not a
/// system-info report.
pub async fn poll_once(remote: &dyn RemoteClient) -> Result<TelemetryCounters, TelemetryError> {
    let outcome = remote
        .execute(RemoteRequest::Query { operation: Operation::SystemInfo })
        .await?;
    match outcome {
        Outcome::StructuredReport(Report::SystemInfo(info)) => Ok(TelemetryCounters {
            stored_hashes: info.stored_hashes,
            backup_files: info.backup_files,
        }),
        Outcome::Failure { message } => Err(TelemetryError::Application(message)),
        _ => Err(TelemetryError::UnexpectedReply),
    }
}

pub struct TelemetryPoller;

impl TelemetryPoller {
    /// Spawn the polling task. The receiver starts at `None` until the first
    /// successful poll.
    #[must_use]
    pub fn spawn(
        remote: Arc<dyn RemoteClient>,
        every: Duration,
    ) -> (JoinHandle<()>, watch::Receiver<Option<TelemetryCounters>>) {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    () = tx.closed() => break,
                }
                match poll_once(remote.as_ref()).await {
                    Ok(counters) => {
                        tx.send_replace(Some(counters));
                    }
                    Err(e) => warn!(error = %e, "telemetry: poll failed"),
                }
            }
            debug!("telemetry: all receivers dropped, stopping");
        });
        (handle, rx)
    }
}
