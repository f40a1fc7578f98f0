//! Upstream chat-completions client
//!
//! Builds the forwarded payload and issues the single upstream POST. The
//! response is handed back unread so the handler can stream it through.

use crate::config::UpstreamConfig;
use crate::error::{AppError, AppResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

/// Server-held bearer credential for the upstream provider
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential; empty or whitespace-only values count as absent
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Read the credential from the named environment variable
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Body sent to the upstream provider
///
/// `messages` is the inbound JSON value, untouched. It is omitted when the
/// inbound body had no `messages` field.
#[derive(Debug, Serialize, PartialEq)]
pub struct UpstreamPayload<'a> {
    pub model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<&'a Value>,
    pub max_completion_tokens: u32,
}

/// Forwards chat completion requests to the configured upstream endpoint
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: UpstreamConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Payload for an inbound request body
    pub fn payload<'a>(&'a self, inbound: &'a Value) -> UpstreamPayload<'a> {
        UpstreamPayload {
            model: self.config.model(),
            messages: inbound.get("messages"),
            max_completion_tokens: self.config.max_completion_tokens(),
        }
    }

    /// Issue one POST upstream and return the response unread
    ///
    /// Any status, including 4xx/5xx, is a successful forward. Only failing
    /// to get a response at all is an error.
    pub async fn forward(&self, api_key: &ApiKey, inbound: &Value) -> AppResult<reqwest::Response> {
        let payload = self.payload(inbound);

        self.http
            .post(self.config.url())
            .header(AUTHORIZATION, api_key.bearer())
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    upstream_url = %self.config.url(),
                    error = %e,
                    "Upstream request failed"
                );
                AppError::UpstreamUnreachable {
                    reason: e.to_string(),
                }
            })
    }
}
