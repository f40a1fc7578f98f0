//! Chat completions forwarding handler
//!
//! Handles POST /v1/chat/completions by relaying the request to the upstream
//! provider with the server-held credential attached.

use crate::error::AppError;
use crate::handlers::AppState;
use crate::middleware::RequestId;
use axum::{
    Extension,
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use futures::TryStreamExt;
use serde_json::Value;

/// Content type used when the upstream does not send one
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// POST /v1/chat/completions handler
///
/// Checks, in order:
/// 1. A credential is configured (500 `Server misconfigured` otherwise). This
///    runs before the body is read, so body size and content never matter.
/// 2. The body fits in `server.max_body_bytes` (413 `Request body too large`).
/// 3. The body is syntactically valid JSON (400 `Invalid JSON` otherwise).
///
/// Then one upstream call is made and its status and body are streamed back
/// as-is. Upstream errors such as 429 are passed through, never retried.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Request,
) -> Result<Response, AppError> {
    let Some(api_key) = state.api_key() else {
        tracing::error!(
            request_id = %request_id,
            api_key_env = %state.config().upstream.api_key_env(),
            "No upstream credential configured, rejecting request"
        );
        return Err(AppError::Misconfigured);
    };

    // Buffered under the router's DefaultBodyLimit (server.max_body_bytes)
    let body = Bytes::from_request(request, &state).await.map_err(|rejection| {
        tracing::debug!(
            request_id = %request_id,
            error = %rejection,
            "Failed to buffer request body"
        );
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InvalidJson
        }
    })?;

    let inbound: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(
            request_id = %request_id,
            error = %e,
            body_bytes = body.len(),
            "Rejecting request with invalid JSON body"
        );
        AppError::InvalidJson
    })?;

    let messages_count = inbound
        .get("messages")
        .and_then(serde_json::Value::as_array)
        .map(Vec::len);
    tracing::debug!(
        request_id = %request_id,
        messages_count,
        "Forwarding chat completions request"
    );

    let upstream_response = state.upstream().forward(api_key, &inbound).await?;

    tracing::info!(
        request_id = %request_id,
        upstream_status = upstream_response.status().as_u16(),
        "Relaying upstream response"
    );

    relay(upstream_response, request_id)
}

/// Turn an upstream response into ours without buffering the body
fn relay(upstream: reqwest::Response, request_id: RequestId) -> Result<Response, AppError> {
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(
            request_id = %request_id,
            error = %e,
            "Upstream body stream interrupted"
        );
    });

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build relay response: {}", e)))
}
