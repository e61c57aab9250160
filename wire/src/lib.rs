//! Request/response contract for the CyberShield file-security service.
//!
//! This crate owns the wire representation used by the client library: which
//! endpoint each operation talks to, what it sends, and how a completed reply
//! is turned into an [`Outcome`]. JSON replies are classified into a typed
//! [`Report`] here, at the boundary, so callers match on variants instead of
//! probing field names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Suffix the service appends to encrypted artifacts.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// Inclusive bounds accepted by the password generator.
pub const MIN_PASSWORD_LENGTH: u8 = 12;
pub const MAX_PASSWORD_LENGTH: u8 = 32;
pub const DEFAULT_PASSWORD_LENGTH: u8 = 16;

/// Error returned while decoding a service reply.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The body could not be parsed as JSON.
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The body parsed, but is not a JSON object.
    #[error("response body is not a JSON object")]
    NotAnObject,
    /// An operation name did not match any known operation.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// A tool the user can trigger against the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Encrypt,
    Decrypt,
    ComputeHash,
    VerifyIntegrity,
    Backup,
    ViewHashes,
    SystemInfo,
    GeneratePassword,
}

/// How the request body for an operation is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestShape {
    /// Multipart upload of the selected artifact under the `file` field.
    Upload,
    /// Parameterless read.
    Query,
    /// JSON-encoded [`PasswordPolicy`].
    Policy,
}

/// What a successful reply for an operation carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    /// Raw bytes to be saved to disk.
    Artifact,
    /// A JSON report.
    Report,
}

impl Operation {
    pub const ALL: [Self; 8] = [
        Self::Encrypt,
        Self::Decrypt,
        Self::ComputeHash,
        Self::VerifyIntegrity,
        Self::Backup,
        Self::ViewHashes,
        Self::SystemInfo,
        Self::GeneratePassword,
    ];

    /// Whether the operation cannot run without a selected artifact.
    #[must_use]
    pub fn needs_artifact(self) -> bool {
        self.request_shape() == RequestShape::Upload
    }

    #[must_use]
    pub fn request_shape(self) -> RequestShape {
        match self {
            Self::Encrypt | Self::Decrypt | Self::ComputeHash | Self::VerifyIntegrity | Self::Backup => {
                RequestShape::Upload
            }
            Self::ViewHashes | Self::SystemInfo => RequestShape::Query,
            Self::GeneratePassword => RequestShape::Policy,
        }
    }

    #[must_use]
    pub fn expects(self) -> Expect {
        match self {
            Self::Encrypt | Self::Decrypt => Expect::Artifact,
            _ => Expect::Report,
        }
    }

    /// Endpoint path relative to the service base URL.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Encrypt => "/encrypt",
            Self::Decrypt => "/decrypt",
            Self::ComputeHash => "/compute_hash",
            Self::VerifyIntegrity => "/verify_integrity",
            Self::Backup => "/backup",
            Self::ViewHashes => "/view_hashes",
            Self::SystemInfo => "/system_info",
            Self::GeneratePassword => "/generate_password",
        }
    }

    /// Stable snake-case identifier, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::ComputeHash => "compute_hash",
            Self::VerifyIntegrity => "verify_integrity",
            Self::Backup => "backup",
            Self::ViewHashes => "view_hashes",
            Self::SystemInfo => "system_info",
            Self::GeneratePassword => "generate_password",
        }
    }

    /// Human-readable name used in log lines, e.g. `"compute hash"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::ComputeHash => "compute hash",
            Self::VerifyIntegrity => "verify integrity",
            Self::Backup => "backup",
            Self::ViewHashes => "view hashes",
            Self::SystemInfo => "system info",
            Self::GeneratePassword => "generate password",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| WireError::UnknownOperation(s.to_owned()))
    }
}

// =============================================================================
// PASSWORD POLICY
// =============================================================================

/// Generation settings sent to `/generate_password`.
///
/// The length is clamped into `[MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH]`.
/// The policy does not require any charset flag to be set; the service rejects
/// an all-false policy itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    length: u8,
    #[serde(rename = "uppercase")]
    pub include_upper: bool,
    #[serde(rename = "lowercase")]
    pub include_lower: bool,
    #[serde(rename = "digits")]
    pub include_digits: bool,
    #[serde(rename = "symbols")]
    pub include_symbols: bool,
}

impl PasswordPolicy {
    /// Policy with every charset enabled and `length` clamped into range.
    #[must_use]
    pub fn new(length: u8) -> Self {
        Self {
            length: clamp_length(length),
            include_upper: true,
            include_lower: true,
            include_digits: true,
            include_symbols: true,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u8) -> Self {
        self.length = clamp_length(length);
        self
    }

    #[must_use]
    pub fn length(&self) -> u8 {
        self.length
    }

    /// `true` when at least one character class is enabled.
    #[must_use]
    pub fn has_charset(&self) -> bool {
        self.include_upper || self.include_lower || self.include_digits || self.include_symbols
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_LENGTH)
    }
}

fn clamp_length(length: u8) -> u8 {
    length.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of one completed remote call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Binary payload to save, with the name the service proposed, if any.
    FileArtifact { bytes: Vec<u8>, suggested_name: Option<String> },
    /// Successful JSON reply.
    StructuredReport(Report),
    /// The service answered with `success: false` or an error status.
    Failure { message: String },
}

/// One entry of the stored-hash listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub hash: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Aggregate service state returned by `/system_info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemInfo {
    pub stored_hashes: u64,
    pub backup_files: u64,
    pub encryption_key: String,
    pub cipher_suite: String,
}

/// A successful JSON reply, classified by which fields it carries.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    Hash { hash: String, filename: String, timestamp: String },
    Integrity { verified: bool, current_hash: String, stored_hash: String },
    Message { message: String },
    Hashes { count: u64, entries: Vec<(String, HashRecord)> },
    SystemInfo(SystemInfo),
    Password { password: String, strength: String },
    /// Successful, but none of the known field sets matched.
    Unrecognized(Map<String, Value>),
}

/// Classify a successful reply's fields.
///
/// Field sets are tested in a fixed order and the first match wins, so a
/// reply carrying both `hash` and `message` is a [`Report::Hash`].
#[must_use]
pub fn classify(fields: Map<String, Value>) -> Report {
    if is_truthy(fields.get("hash")) {
        return Report::Hash {
            hash: text_field(&fields, "hash"),
            filename: text_field(&fields, "filename"),
            timestamp: text_field(&fields, "timestamp"),
        };
    }
    if let Some(verified) = fields.get("integrity_verified").and_then(Value::as_bool) {
        return Report::Integrity {
            verified,
            current_hash: text_field(&fields, "current_hash"),
            stored_hash: text_field(&fields, "stored_hash"),
        };
    }
    if is_truthy(fields.get("message")) {
        return Report::Message { message: text_field(&fields, "message") };
    }
    if is_truthy(fields.get("hashes")) {
        let entries: Vec<(String, HashRecord)> = match fields.get("hashes") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, record)| (name.clone(), hash_record(record)))
                .collect(),
            _ => Vec::new(),
        };
        let count = fields
            .get("count")
            .and_then(Value::as_u64)
            .unwrap_or(entries.len() as u64);
        return Report::Hashes { count, entries };
    }
    if fields.get("stored_hashes").is_some_and(|v| !v.is_null()) {
        return Report::SystemInfo(SystemInfo {
            stored_hashes: count_field(&fields, "stored_hashes"),
            backup_files: count_field(&fields, "backup_files"),
            encryption_key: text_field(&fields, "encryption_key"),
            cipher_suite: text_field(&fields, "cipher_suite"),
        });
    }
    if is_truthy(fields.get("password")) {
        return Report::Password {
            password: text_field(&fields, "password"),
            strength: text_field(&fields, "strength"),
        };
    }
    Report::Unrecognized(fields)
}

/// Decode the body of a JSON endpoint.
///
/// `success: true` yields a classified report; anything else is a failure
/// carrying the service's `error` text, or `"Operation failed"` without one.
///
/// # Errors
///
/// Returns [`WireError::Json`] for malformed bodies and
/// [`WireError::NotAnObject`] when the body is valid JSON but not an object.
pub fn decode_report_body(bytes: &[u8]) -> Result<Outcome, WireError> {
    let fields = parse_object(bytes)?;
    if fields.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(Outcome::StructuredReport(classify(fields)));
    }
    Ok(Outcome::Failure { message: error_text(&fields, "Operation failed") })
}

/// Decode the error body a binary endpoint sends alongside a non-2xx status.
///
/// # Errors
///
/// Same as [`decode_report_body`].
pub fn decode_failure_body(bytes: &[u8]) -> Result<Outcome, WireError> {
    let fields = parse_object(bytes)?;
    Ok(Outcome::Failure { message: error_text(&fields, "Unknown error") })
}

/// Extract the `filename` parameter of a `Content-Disposition` header value.
#[must_use]
pub fn attachment_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn parse_object(bytes: &[u8]) -> Result<Map<String, Value>, WireError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(WireError::NotAnObject),
    }
}

fn error_text(fields: &Map<String, Value>, default: &str) -> String {
    match fields.get("error") {
        Some(value) if is_truthy(Some(value)) => render(value),
        _ => default.to_owned(),
    }
}

fn hash_record(value: &Value) -> HashRecord {
    HashRecord {
        hash: value.get("hash").map(render).unwrap_or_default(),
        timestamp: value.get("timestamp").and_then(Value::as_str).map(str::to_owned),
        size: value.get("size").and_then(Value::as_u64),
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).map(render).unwrap_or_default()
}

fn count_field(fields: &Map<String, Value>, key: &str) -> u64 {
    fields.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Strings render bare; everything else renders as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Presence test used for the text-valued discriminating fields: the service
/// omits a field or sends an empty value when it does not apply.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
