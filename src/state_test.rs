use super::*;

#[test]
fn store_starts_empty() {
    let store = SelectionStore::new();
    assert!(store.is_empty());
    assert!(store.current().is_none());
}

#[test]
fn select_replaces_previous_artifact() {
    let store = SelectionStore::new();
    store.select(SelectedArtifact::new("a.txt", b"aaa".to_vec()));
    let first = store.current().unwrap();

    store.select(SelectedArtifact::new("b.txt", b"bb".to_vec()));
    let second = store.current().unwrap();

    assert_eq!(second.name, "b.txt");
    assert_eq!(second.size_bytes, 2);
    // Readers holding the old artifact keep it intact.
    assert_eq!(first.name, "a.txt");
    assert_eq!(&*first.bytes, b"aaa");
}

#[test]
fn summary_formats_size_and_type() {
    let artifact = SelectedArtifact::new("report.pdf", vec![0_u8; 1536]).with_mime_type("application/pdf");
    assert_eq!(artifact.summary(), "report.pdf\nSize: 1.5 KB\nType: application/pdf");
}

#[test]
fn summary_without_mime_is_unknown() {
    let artifact = SelectedArtifact::new("empty.bin", Vec::new());
    assert_eq!(artifact.summary(), "empty.bin\nSize: 0 Bytes\nType: Unknown");
}

#[tokio::test]
async fn from_path_reads_name_and_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();

    let artifact = SelectedArtifact::from_path(&path).await.unwrap();
    assert_eq!(artifact.name, "notes.txt");
    assert_eq!(artifact.size_bytes, 5);
    assert_eq!(&*artifact.bytes, b"hello");
    assert!(artifact.mime_type.is_none());
}

#[tokio::test]
async fn from_path_missing_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = SelectedArtifact::from_path(dir.path().join("nope")).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[tokio::test]
async fn select_artifact_emits_log_and_notification() {
    let session = Session::new();
    let feedback = Feedback::new();

    let summary = session.select_artifact(SelectedArtifact::new("a.txt", vec![0_u8; 1024]), &feedback);

    assert!(summary.starts_with("a.txt\n"));
    assert_eq!(feedback.log.texts(), vec!["File selected: a.txt (1 KB)".to_owned()]);
    let live = feedback.notifications.live();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].text, "File selected: a.txt");
    assert_eq!(live[0].severity, Severity::Success);
}

#[test]
fn secret_is_superseded() {
    let session = Session::new();
    assert!(session.secret().is_none());

    session.store_secret(GeneratedSecret { value: "one".into(), strength_label: "WEAK".into() });
    session.store_secret(GeneratedSecret { value: "two".into(), strength_label: "STRONG".into() });

    assert_eq!(session.secret().unwrap().value, "two");
}
