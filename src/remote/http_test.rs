use std::sync::Arc;

use wire::PasswordPolicy;

use super::*;

#[test]
fn new_trims_trailing_slashes() {
    let remote = HttpRemote::new("http://localhost:5000//").unwrap();
    assert_eq!(remote.base_url(), "http://localhost:5000");
}

#[test]
fn url_joins_base_and_operation_path() {
    let remote = HttpRemote::new("https://shield.example/api/").unwrap();
    assert_eq!(remote.url(Operation::ComputeHash), "https://shield.example/api/compute_hash");
    assert_eq!(remote.url(Operation::SystemInfo), "https://shield.example/api/system_info");
}

#[test]
fn every_operation_gets_a_distinct_url() {
    let remote = HttpRemote::new("http://h").unwrap();
    let mut urls: Vec<String> = Operation::ALL.into_iter().map(|op| remote.url(op)).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), Operation::ALL.len());
}

#[test]
fn request_reports_its_operation() {
    let upload = RemoteRequest::Upload {
        operation: Operation::Backup,
        file_name: "a.txt".into(),
        mime_type: None,
        bytes: Arc::from(&b"abc"[..]),
    };
    assert_eq!(upload.operation(), Operation::Backup);

    let query = RemoteRequest::Query { operation: Operation::ViewHashes };
    assert_eq!(query.operation(), Operation::ViewHashes);

    let policy = RemoteRequest::GeneratePassword(PasswordPolicy::default());
    assert_eq!(policy.operation(), Operation::GeneratePassword);
}

#[tokio::test]
async fn unreachable_service_is_a_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let remote = HttpRemote::new(format!("http://{addr}")).unwrap();
    let err = remote
        .execute(RemoteRequest::Query { operation: Operation::SystemInfo })
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Request(_)), "got {err:?}");
}
