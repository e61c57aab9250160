//! HTTP implementation of [`RemoteClient`].
//!
//! Binary endpoints answer with raw bytes on success and a JSON error body
//! otherwise. JSON endpoints always answer with a JSON object whose `success`
//! flag decides the outcome, whatever the HTTP status.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use wire::{Expect, Operation, Outcome};

use super::types::{RemoteClient, RemoteError, RemoteRequest};
use crate::config::ClientConfig;

pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    /// Build a client for the service at `base_url`.
    ///
    /// No request timeout is set: a dispatched call runs until the service
    /// answers or the connection fails.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::HttpClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RemoteError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    /// # Errors
    ///
    /// See [`HttpRemote::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, RemoteError> {
        Self::new(config.base_url.clone())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, operation: Operation) -> String {
        format!("{}{}", self.base_url, operation.path())
    }

    async fn send(&self, request: RemoteRequest) -> Result<reqwest::Response, RemoteError> {
        let operation = request.operation();
        let url = self.url(operation);
        debug!(%operation, %url, "sending request");
        let builder = match request {
            RemoteRequest::Upload { file_name, mime_type, bytes, .. } => {
                let part = upload_part(&file_name, mime_type.as_deref(), &bytes);
                self.http.post(url).multipart(Form::new().part("file", part))
            }
            RemoteRequest::Query { .. } => self.http.get(url),
            RemoteRequest::GeneratePassword(policy) => self.http.post(url).json(&policy),
        };
        builder
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))
    }
}

#[async_trait]
impl RemoteClient for HttpRemote {
    async fn execute(&self, request: RemoteRequest) -> Result<Outcome, RemoteError> {
        let operation = request.operation();
        let response = self.send(request).await?;
        let status = response.status();
        debug!(%operation, status = status.as_u16(), "response received");

        match operation.expects() {
            Expect::Artifact if status.is_success() => {
                let suggested_name = response
                    .headers()
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(wire::attachment_filename);
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| RemoteError::Body(e.to_string()))?;
                Ok(Outcome::FileArtifact { bytes: bytes.to_vec(), suggested_name })
            }
            Expect::Artifact => {
                let body = read_body(response).await?;
                Ok(wire::decode_failure_body(&body)?)
            }
            Expect::Report => {
                let body = read_body(response).await?;
                Ok(wire::decode_report_body(&body)?)
            }
        }
    }
}

fn upload_part(file_name: &str, mime_type: Option<&str>, bytes: &[u8]) -> Part {
    let plain = || Part::bytes(bytes.to_vec()).file_name(file_name.to_owned());
    match mime_type {
        Some(mime) => plain().mime_str(mime).unwrap_or_else(|err| {
            debug!(%mime, error = %err, "ignoring unusable mime type");
            plain()
        }),
        None => plain(),
    }
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, RemoteError> {
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| RemoteError::Body(e.to_string()))
}
