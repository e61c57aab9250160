use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use wire::SystemInfo;

use super::*;

/// Reports `n` stored hashes on the `n`-th call.
#[derive(Default)]
struct CountingRemote {
    calls: AtomicU64,
}

#[async_trait]
impl RemoteClient for CountingRemote {
    async fn execute(&self, _request: RemoteRequest) -> Result<Outcome, RemoteError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Outcome::StructuredReport(Report::SystemInfo(SystemInfo {
            stored_hashes: n,
            backup_files: n * 10,
            encryption_key: "Active".into(),
            cipher_suite: "Fernet".into(),
        })))
    }
}

struct Scripted(Mutex<Vec<Result<Outcome, RemoteError>>>);

#[async_trait]
impl RemoteClient for Scripted {
    async fn execute(&self, _request: RemoteRequest) -> Result<Outcome, RemoteError> {
        self.0.lock().unwrap().remove(0)
    }
}

#[tokio::test]
async fn poll_once_extracts_counters() {
    let remote = CountingRemote::default();
    let counters = poll_once(&remote).await.unwrap();
    assert_eq!(counters, TelemetryCounters { stored_hashes: 1, backup_files: 10 });
}

#[tokio::test]
async fn poll_once_maps_failures() {
    let remote = Scripted(Mutex::new(vec![
        Ok(Outcome::Failure { message: "down".into() }),
        Ok(Outcome::StructuredReport(Report::Message { message: "hi".into() })),
        Err(RemoteError::Request("refused".into())),
    ]));
    assert!(matches!(poll_once(&remote).await, Err(TelemetryError::Application(m)) if m == "down"));
    assert!(matches!(poll_once(&remote).await, Err(TelemetryError::UnexpectedReply)));
    assert!(matches!(poll_once(&remote).await, Err(TelemetryError::Remote(_))));
}

#[tokio::test(start_paused = true)]
async fn first_poll_is_immediate_then_every_interval() {
    let remote = Arc::new(CountingRemote::default());
    let (_handle, mut rx) = TelemetryPoller::spawn(remote.clone(), Duration::from_secs(5));
    let started = tokio::time::Instant::now();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().unwrap().stored_hashes, 1);
    assert!(started.elapsed() < Duration::from_secs(1));

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), Some(TelemetryCounters { stored_hashes: 2, backup_files: 20 }));
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failures_keep_last_value() {
    let ok = Outcome::StructuredReport(Report::SystemInfo(SystemInfo {
        stored_hashes: 4,
        backup_files: 2,
        encryption_key: "Active".into(),
        cipher_suite: "Fernet".into(),
    }));
    let remote = Arc::new(Scripted(Mutex::new(vec![
        Ok(ok),
        Err(RemoteError::Request("refused".into())),
        Ok(Outcome::Failure { message: "busy".into() }),
        Err(RemoteError::Request("refused".into())),
        Err(RemoteError::Request("refused".into())),
    ])));
    let (_handle, mut rx) = TelemetryPoller::spawn(remote, Duration::from_secs(1));

    rx.changed().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(!rx.has_changed().unwrap());
    assert_eq!(*rx.borrow(), Some(TelemetryCounters { stored_hashes: 4, backup_files: 2 }));
}

#[tokio::test(start_paused = true)]
async fn stops_when_receivers_drop() {
    let remote = Arc::new(CountingRemote::default());
    let (handle, rx) = TelemetryPoller::spawn(remote, Duration::from_secs(5));

    drop(rx);

    handle.await.unwrap();
}
