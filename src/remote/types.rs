//! Requests and the client trait at the remote boundary.

use std::sync::Arc;

use wire::{Operation, Outcome, PasswordPolicy, WireError};

// =============================================================================
// ERROR
// =============================================================================

/// The call did not produce a usable reply.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never completed (connection refused, reset, DNS...).
    #[error("request failed: {0}")]
    Request(String),

    /// The response started but its body could not be read.
    #[error("could not read response: {0}")]
    Body(String),

    /// The body was read but does not follow the contract.
    #[error("malformed response: {0}")]
    Decode(#[from] WireError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// REQUEST
// =============================================================================

/// One fully built request, ready to send.
#[derive(Clone, Debug)]
pub enum RemoteRequest {
    /// Multipart upload of the artifact under the `file` field.
    Upload {
        operation: Operation,
        file_name: String,
        mime_type: Option<String>,
        bytes: Arc<[u8]>,
    },
    /// Parameterless read.
    Query { operation: Operation },
    /// Password generation with the given policy.
    GeneratePassword(PasswordPolicy),
}

impl RemoteRequest {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Upload { operation, .. } | Self::Query { operation } => *operation,
            Self::GeneratePassword(_) => Operation::GeneratePassword,
        }
    }
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

/// The remote collaborator. Implemented over HTTP by
/// [`HttpRemote`](super::HttpRemote) and by mocks in tests.
#[async_trait::async_trait]
pub trait RemoteClient: Send + Sync {
    /// Send `request` and classify the reply.
    ///
    /// Application-level failures (`success: false`, error statuses) come back
    /// as [`Outcome::Failure`]; only calls that produced no usable reply are
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the call did not complete or the reply
    /// could not be decoded.
    async fn execute(&self, request: RemoteRequest) -> Result<Outcome, RemoteError>;
}
