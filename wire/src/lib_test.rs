use super::*;
use serde_json::json;

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// =============================================================
// Operation
// =============================================================

#[test]
fn upload_operations_need_an_artifact() {
    let needing: Vec<Operation> = Operation::ALL
        .into_iter()
        .filter(|op| op.needs_artifact())
        .collect();
    assert_eq!(
        needing,
        vec![
            Operation::Encrypt,
            Operation::Decrypt,
            Operation::ComputeHash,
            Operation::VerifyIntegrity,
            Operation::Backup,
        ]
    );
}

#[test]
fn only_encrypt_and_decrypt_expect_artifacts() {
    for op in Operation::ALL {
        let expected = matches!(op, Operation::Encrypt | Operation::Decrypt);
        assert_eq!(op.expects() == Expect::Artifact, expected, "{op:?}");
    }
}

#[test]
fn generate_password_sends_a_policy() {
    assert_eq!(Operation::GeneratePassword.request_shape(), RequestShape::Policy);
    assert_eq!(Operation::ViewHashes.request_shape(), RequestShape::Query);
    assert_eq!(Operation::SystemInfo.request_shape(), RequestShape::Query);
}

#[test]
fn paths_match_service_routes() {
    assert_eq!(Operation::ComputeHash.path(), "/compute_hash");
    assert_eq!(Operation::VerifyIntegrity.path(), "/verify_integrity");
    assert_eq!(Operation::GeneratePassword.path(), "/generate_password");
}

#[test]
fn labels_replace_underscores_with_spaces() {
    assert_eq!(Operation::ComputeHash.to_string(), "compute hash");
    assert_eq!(Operation::SystemInfo.to_string(), "system info");
    assert_eq!(Operation::Encrypt.to_string(), "encrypt");
}

#[test]
fn operation_parses_from_snake_case_name() {
    assert_eq!("view_hashes".parse::<Operation>().expect("parse"), Operation::ViewHashes);
    let err = "shred".parse::<Operation>().expect_err("unknown op");
    assert!(matches!(err, WireError::UnknownOperation(name) if name == "shred"));
}

// =============================================================
// PasswordPolicy
// =============================================================

#[test]
fn default_policy_enables_every_charset_at_length_16() {
    let policy = PasswordPolicy::default();
    assert_eq!(policy.length(), 16);
    assert!(policy.include_upper && policy.include_lower && policy.include_digits && policy.include_symbols);
}

#[test]
fn policy_length_is_clamped_into_range() {
    assert_eq!(PasswordPolicy::new(4).length(), MIN_PASSWORD_LENGTH);
    assert_eq!(PasswordPolicy::new(200).length(), MAX_PASSWORD_LENGTH);
    assert_eq!(PasswordPolicy::default().with_length(20).length(), 20);
}

#[test]
fn policy_serializes_with_service_field_names() {
    let mut policy = PasswordPolicy::new(24);
    policy.include_symbols = false;
    let value = serde_json::to_value(policy).expect("serialize");
    assert_eq!(
        value,
        json!({"length": 24, "uppercase": true, "lowercase": true, "digits": true, "symbols": false})
    );
}

#[test]
fn all_false_policy_has_no_charset() {
    let policy = PasswordPolicy {
        include_upper: false,
        include_lower: false,
        include_digits: false,
        include_symbols: false,
        ..PasswordPolicy::default()
    };
    assert!(!policy.has_charset());
}

// =============================================================
// classify
// =============================================================

#[test]
fn hash_wins_over_message() {
    let report = classify(fields(json!({
        "success": true,
        "hash": "abc",
        "message": "also here",
        "filename": "a.txt",
        "timestamp": "2024-01-02T03:04:05"
    })));
    assert_eq!(
        report,
        Report::Hash {
            hash: "abc".into(),
            filename: "a.txt".into(),
            timestamp: "2024-01-02T03:04:05".into(),
        }
    );
}

#[test]
fn integrity_false_is_still_classified() {
    let report = classify(fields(json!({
        "success": true,
        "integrity_verified": false,
        "current_hash": "c",
        "stored_hash": "s"
    })));
    assert_eq!(
        report,
        Report::Integrity { verified: false, current_hash: "c".into(), stored_hash: "s".into() }
    );
}

#[test]
fn message_report() {
    let report = classify(fields(json!({"success": true, "message": "Backup created: x"})));
    assert_eq!(report, Report::Message { message: "Backup created: x".into() });
}

#[test]
fn empty_message_falls_through() {
    let report = classify(fields(json!({"success": true, "message": ""})));
    assert!(matches!(report, Report::Unrecognized(_)));
}

#[test]
fn hashes_keep_service_order() {
    let report = classify(fields(json!({
        "success": true,
        "hashes": {
            "zeta.txt": {"hash": "z1", "timestamp": "t", "size": 3},
            "alpha.txt": {"hash": "a1"}
        },
        "count": 2
    })));
    let Report::Hashes { count, entries } = report else {
        panic!("expected hashes report");
    };
    assert_eq!(count, 2);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["zeta.txt", "alpha.txt"]);
    assert_eq!(entries[0].1.size, Some(3));
    assert_eq!(entries[1].1.hash, "a1");
}

#[test]
fn empty_hash_listing_is_still_a_listing() {
    let report = classify(fields(json!({"success": true, "hashes": {}, "count": 0})));
    assert_eq!(report, Report::Hashes { count: 0, entries: Vec::new() });
}

#[test]
fn system_info_report() {
    let report = classify(fields(json!({
        "success": true,
        "stored_hashes": 0,
        "backup_files": 4,
        "encryption_key": "Loaded",
        "cipher_suite": "Active"
    })));
    assert_eq!(
        report,
        Report::SystemInfo(SystemInfo {
            stored_hashes: 0,
            backup_files: 4,
            encryption_key: "Loaded".into(),
            cipher_suite: "Active".into(),
        })
    );
}

#[test]
fn password_report() {
    let report = classify(fields(json!({"success": true, "password": "pw", "strength": "STRONG"})));
    assert_eq!(report, Report::Password { password: "pw".into(), strength: "STRONG".into() });
}

#[test]
fn unknown_fields_are_unrecognized() {
    let report = classify(fields(json!({"success": true, "weather": "sunny"})));
    let Report::Unrecognized(map) = report else {
        panic!("expected unrecognized");
    };
    assert_eq!(map.get("weather"), Some(&json!("sunny")));
}

// =============================================================
// Body decoding
// =============================================================

#[test]
fn failure_body_carries_error_text() {
    let outcome = decode_report_body(br#"{"success": false, "error": "No stored hash found for this file"}"#)
        .expect("decode");
    assert_eq!(outcome, Outcome::Failure { message: "No stored hash found for this file".into() });
}

#[test]
fn failure_without_success_flag_uses_default_text() {
    let outcome = decode_report_body(br#"{"error": ""}"#).expect("decode");
    assert_eq!(outcome, Outcome::Failure { message: "Operation failed".into() });
}

#[test]
fn binary_endpoint_error_defaults_to_unknown() {
    let outcome = decode_failure_body(b"{}").expect("decode");
    assert_eq!(outcome, Outcome::Failure { message: "Unknown error".into() });
}

#[test]
fn malformed_body_is_a_decode_error() {
    let err = decode_report_body(b"<html>").expect_err("not json");
    assert!(matches!(err, WireError::Json(_)));
    let err = decode_report_body(b"[1, 2]").expect_err("not an object");
    assert!(matches!(err, WireError::NotAnObject));
}

#[test]
fn attachment_filename_handles_quoted_and_bare_values() {
    assert_eq!(
        attachment_filename(r#"attachment; filename="report.pdf.encrypted""#),
        Some("report.pdf.encrypted".to_owned())
    );
    assert_eq!(attachment_filename("attachment; filename=a.txt"), Some("a.txt".to_owned()));
    assert_eq!(attachment_filename("inline"), None);
}
