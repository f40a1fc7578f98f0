//! Permissive CORS policy
//!
//! Any origin may call the proxy. Preflight `OPTIONS` requests on any path are
//! answered by the CORS layer and reported as 204 No Content.

use super::request_id::REQUEST_ID_HEADER;
use axum::{
    extract::Request,
    http::{HeaderName, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

/// CORS layer allowing any origin and any request header
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Report successful preflight responses as 204 No Content
///
/// Must wrap the CORS layer, which answers preflights itself with 200.
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}
