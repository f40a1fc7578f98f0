//! HTTP transport abstraction for the client request helper
//!
//! The helper never reaches for a global HTTP client; callers hand it a
//! `Transport`. `ReqwestTransport` is the production implementation, tests
//! supply their own.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::future::Future;
use thiserror::Error;

/// Failure to send a request or to read a response body
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Response whose status is known and whose body has not been read yet
pub struct TransportResponse {
    status: StatusCode,
    body: BoxFuture<'static, Result<Bytes, TransportError>>,
}

impl TransportResponse {
    /// Build a response from a status and a deferred body read
    pub fn new<F>(status: StatusCode, body: F) -> Self
    where
        F: Future<Output = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            status,
            body: Box::pin(body),
        }
    }

    /// Build a response whose body is already in memory
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, async move { Ok(body) })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Read the whole body
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        self.body.await
    }

    /// Read the whole body as text, replacing invalid UTF-8 sequences
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Issues a single POST and hands back the unread response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<TransportResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`
///
/// Connection reuse and timeouts are whatever the client was built with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        Ok(TransportResponse::new(status, async move {
            response.bytes().await.map_err(TransportError::from)
        }))
    }
}
