//! Client-side JSON request helper
//!
//! `post_json` performs one JSON POST through an injected [`Transport`] and
//! turns every non-success status into an [`HttpError`]. It holds no state,
//! so concurrent calls are independent of each other.

pub mod api;
pub mod transport;

pub use api::ChatApi;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use thiserror::Error;

/// Number of body characters kept in an `HttpError` message
pub const ERROR_BODY_PREVIEW_CHARS: usize = 500;
/// Marker appended to a truncated body preview
pub const ELLIPSIS: char = '…';

/// Non-success HTTP response
///
/// `message` carries a truncated preview of the body; `body` keeps the full text
/// (empty when the body could not be read).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    message: String,
    status: u16,
    body: String,
}

impl HttpError {
    pub const KIND: &'static str = "HttpError";

    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = format!(
            "HTTP {}: {}",
            status.as_u16(),
            truncate(&body, ERROR_BODY_PREVIEW_CHARS)
        );
        Self {
            message,
            status: status.as_u16(),
            body,
        }
    }

    pub fn kind(&self) -> &'static str {
        Self::KIND
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Everything that can go wrong in a client request
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl RequestError {
    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status()),
            _ => None,
        }
    }

    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Cut `s` to at most `max_chars` characters, appending [`ELLIPSIS`] if anything was cut
pub fn truncate(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(format!("{}{}", &s[..idx], ELLIPSIS)),
        None => Cow::Borrowed(s),
    }
}

fn build_headers(extra: &[(&str, &str)]) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| RequestError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// POST `body` as JSON to `url` and decode the JSON response
///
/// `headers` are merged over the default `Content-Type: application/json`.
/// Exactly one request is sent; nothing is retried or cached.
///
/// # Errors
///
/// - [`RequestError::Http`] for any non-2xx status. If the error body cannot be
///   read it is treated as empty.
/// - [`RequestError::Transport`] when the request could not be sent, or a
///   success body could not be read.
/// - [`RequestError::Decode`] when a success body is not the expected JSON.
pub async fn post_json<Req, Res>(
    transport: &dyn Transport,
    url: &str,
    body: &Req,
    headers: &[(&str, &str)],
) -> Result<Res, RequestError>
where
    Req: Serialize + ?Sized,
    Res: DeserializeOwned,
{
    let payload = serde_json::to_vec(body).map_err(RequestError::Encode)?;
    let headers = build_headers(headers)?;

    let response = transport
        .post(url, headers, Bytes::from(payload))
        .await
        .map_err(|source| RequestError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    tracing::debug!(url = %url, status = status.as_u16(), "POST completed");

    if !status.is_success() {
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(
                    url = %url,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read error body, treating it as empty"
                );
                String::new()
            }
        };
        return Err(HttpError::new(status, text).into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| RequestError::Transport {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| RequestError::Decode {
        url: url.to_string(),
        source,
    })
}
