//! Chat completions API wrapper over `post_json`

use super::transport::{ReqwestTransport, Transport};
use super::{RequestError, post_json};
use crate::types::{ChatCompletionsRequest, ChatCompletionsResponse};
use std::sync::Arc;

/// Environment variable holding the proxy base URL
pub const BASE_URL_ENV: &str = "CHAT_PROXY_BASE_URL";
/// Path of the chat completions endpoint, relative to the base URL
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Calls the proxy's chat completions endpoint
#[derive(Clone)]
pub struct ChatApi {
    base_url: Option<String>,
    transport: Arc<dyn Transport>,
}

impl ChatApi {
    pub fn new(base_url: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    /// Base URL from `CHAT_PROXY_BASE_URL`, default `reqwest` transport
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(BASE_URL_ENV).ok(),
            Arc::new(ReqwestTransport::default()),
        )
    }

    /// Full URL of the completions endpoint
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NotConfigured`] if no base URL is set.
    pub fn completions_url(&self) -> Result<String, RequestError> {
        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or(RequestError::NotConfigured(BASE_URL_ENV))?;

        Ok(format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH))
    }

    /// Send a chat completion request through the proxy
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionsRequest,
    ) -> Result<ChatCompletionsResponse, RequestError> {
        let url = self.completions_url()?;
        tracing::debug!(
            url = %url,
            messages_count = request.messages.len(),
            "Sending chat completion request"
        );
        post_json(self.transport.as_ref(), &url, request, &[]).await
    }
}

impl std::fmt::Debug for ChatApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
