//! Operation dispatcher, the single entry point for every remote operation.
//!
//! DESIGN
//! ======
//! `invoke` runs one operation end to end:
//!
//! 1. precondition: upload operations need a selected artifact
//! 2. busy control: at most one in-flight invocation per operation kind
//! 3. request construction from the session snapshot
//! 4. the remote call
//! 5. outcome routing: artifacts to the sink, password reports to the
//!    password panel, everything else to the interpreter
//!
//! Every failure along the way is converted to exactly one error notification
//! plus one error log entry at this boundary. Nothing escapes `invoke`; the
//! returned [`DispatchStatus`] only tells the caller what happened.

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;

use std::sync::Arc;

use tracing::{debug, info, warn};
use wire::{ENCRYPTED_SUFFIX, Expect, Operation, Outcome, PasswordPolicy, Report, RequestShape};

use super::busy::BusyMap;
use super::interpret::Interpreter;
use super::password;
use super::sink::ArtifactSink;
use super::{Feedback, Severity};
use crate::remote::{RemoteClient, RemoteError, RemoteRequest};
use crate::state::{GeneratedSecret, Session};

pub const SELECT_FIRST_NOTIFICATION: &str = "Please select a file first";
pub const DOWNLOADED_NOTIFICATION: &str = "File downloaded successfully";

// =============================================================================
// ERRORS & STATUS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no file selected")]
    Selection,

    #[error(transparent)]
    Transport(#[from] RemoteError),

    /// The service answered with `success: false` or an error status.
    #[error("{0}")]
    Application(String),

    #[error("could not save {name}: {source}")]
    Save {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expected {expected}, received {received}")]
    UnexpectedOutcome { expected: &'static str, received: &'static str },
}

/// What a call to [`Dispatcher::invoke`] ended with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchStatus {
    Completed,
    /// The remote call or outcome handling failed; already reported.
    Failed,
    /// A precondition failed before any remote call; already reported.
    Blocked,
    /// Another invocation of the same kind is in flight; nothing happened.
    Busy,
}

impl DispatchStatus {
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Completed
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

pub struct Dispatcher {
    remote: Arc<dyn RemoteClient>,
    sink: Arc<dyn ArtifactSink>,
    feedback: Feedback,
    busy: BusyMap,
    interpreter: Interpreter,
}

impl Dispatcher {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteClient>, sink: Arc<dyn ArtifactSink>, feedback: Feedback) -> Self {
        let interpreter = Interpreter::new(feedback.clone());
        Self { remote, sink, feedback, busy: BusyMap::new(), interpreter }
    }

    #[must_use]
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    #[must_use]
    pub fn busy(&self) -> &BusyMap {
        &self.busy
    }

    #[must_use]
    pub fn is_busy(&self, operation: Operation) -> bool {
        self.busy.is_busy(operation)
    }

    /// Run `operation` against the remote service.
    ///
    /// `policy` is only read for [`Operation::GeneratePassword`]; `None` means
    /// the default policy.
    pub async fn invoke(
        &self,
        session: &Session,
        operation: Operation,
        policy: Option<PasswordPolicy>,
    ) -> DispatchStatus {
        if operation.needs_artifact() && session.artifact().is_none() {
            self.report_failure(operation, &DispatchError::Selection);
            return DispatchStatus::Blocked;
        }

        let Some(_token) = self.busy.try_acquire(operation) else {
            debug!(%operation, "dispatch: already in flight, ignoring");
            return DispatchStatus::Busy;
        };

        match self.run(session, operation, policy).await {
            Ok(()) => DispatchStatus::Completed,
            Err(err) => {
                self.report_failure(operation, &err);
                DispatchStatus::Failed
            }
        }
    }

    async fn run(
        &self,
        session: &Session,
        operation: Operation,
        policy: Option<PasswordPolicy>,
    ) -> Result<(), DispatchError> {
        let (request, source_name) = build_request(session, operation, policy)?;
        info!(%operation, "dispatch: sending");
        let outcome = self.remote.execute(request).await?;

        match (operation.expects(), outcome) {
            (_, Outcome::Failure { message }) => Err(DispatchError::Application(message)),
            (Expect::Artifact, Outcome::FileArtifact { bytes, suggested_name }) => {
                let name = artifact_name(operation, source_name.as_deref().unwrap_or_default());
                if let Some(suggested) = suggested_name.filter(|s| *s != name) {
                    debug!(%operation, %suggested, derived = %name, "dispatch: service proposed a different name");
                }
                self.save_artifact(&name, &bytes).await
            }
            (Expect::Report, Outcome::StructuredReport(report)) => self.route_report(session, operation, report),
            (expected, other) => Err(DispatchError::UnexpectedOutcome {
                expected: expect_kind(expected),
                received: outcome_kind(&other),
            }),
        }
    }

    fn route_report(&self, session: &Session, operation: Operation, report: Report) -> Result<(), DispatchError> {
        if operation != Operation::GeneratePassword {
            self.interpreter.interpret(&report);
            return Ok(());
        }
        match report {
            Report::Password { password, strength } => {
                let secret = GeneratedSecret { value: password, strength_label: strength };
                password::record_secret(session, &self.feedback, secret);
                Ok(())
            }
            _ => Err(DispatchError::UnexpectedOutcome { expected: "password report", received: "report" }),
        }
    }

    async fn save_artifact(&self, name: &str, bytes: &[u8]) -> Result<(), DispatchError> {
        let path = self
            .sink
            .save(name, bytes)
            .await
            .map_err(|source| DispatchError::Save { name: name.to_owned(), source })?;
        debug!(path = %path.display(), len = bytes.len(), "dispatch: artifact saved");
        self.feedback
            .notifications
            .push(Severity::Success, DOWNLOADED_NOTIFICATION);
        self.feedback
            .log
            .success(format!("File processed and downloaded: {name}"));
        Ok(())
    }

    fn report_failure(&self, operation: Operation, err: &DispatchError) {
        warn!(%operation, error = %err, "dispatch: operation failed");
        let (notification, log_line) = failure_texts(operation, err);
        self.feedback.fail(notification, log_line);
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// The notification and log line reported for `err`.
#[must_use]
pub fn failure_texts(operation: Operation, err: &DispatchError) -> (String, String) {
    let log_line = format!("{} failed: {err}", operation.label());
    let notification = match (operation, err) {
        (_, DispatchError::Selection) => SELECT_FIRST_NOTIFICATION.to_owned(),
        (Operation::GeneratePassword, _) => format!("Password generation failed: {err}"),
        _ => format!("Operation failed: {err}"),
    };
    (notification, log_line)
}

/// Name under which a downloaded artifact is saved.
///
/// Encrypt appends `.encrypted`. Decrypt removes the first occurrence of
/// `.encrypted` wherever it appears, and leaves names without it unchanged.
#[must_use]
pub fn artifact_name(operation: Operation, source: &str) -> String {
    match operation {
        Operation::Encrypt => format!("{source}{ENCRYPTED_SUFFIX}"),
        Operation::Decrypt => source.replacen(ENCRYPTED_SUFFIX, "", 1),
        _ => source.to_owned(),
    }
}

fn build_request(
    session: &Session,
    operation: Operation,
    policy: Option<PasswordPolicy>,
) -> Result<(RemoteRequest, Option<String>), DispatchError> {
    match operation.request_shape() {
        RequestShape::Upload => {
            let artifact = session.artifact().ok_or(DispatchError::Selection)?;
            let request = RemoteRequest::Upload {
                operation,
                file_name: artifact.name.clone(),
                mime_type: artifact.mime_type.clone(),
                bytes: Arc::clone(&artifact.bytes),
            };
            Ok((request, Some(artifact.name.clone())))
        }
        RequestShape::Query => Ok((RemoteRequest::Query { operation }, None)),
        RequestShape::Policy => Ok((RemoteRequest::GeneratePassword(policy.unwrap_or_default()), None)),
    }
}

fn expect_kind(expect: Expect) -> &'static str {
    match expect {
        Expect::Artifact => "file artifact",
        Expect::Report => "report",
    }
}

fn outcome_kind(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::FileArtifact { .. } => "file artifact",
        Outcome::StructuredReport(_) => "report",
        Outcome::Failure { .. } => "failure",
    }
}
