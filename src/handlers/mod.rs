//! HTTP request handlers for the proxy API

use crate::config::Config;
use crate::middleware::{cors, request_id_middleware};
use crate::upstream::{ApiKey, UpstreamClient};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod completions;
pub mod health;

/// Application state shared across all handlers
///
/// Everything in here is immutable after startup; requests share nothing
/// mutable. All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    api_key: Option<Arc<ApiKey>>,
    upstream: Arc<UpstreamClient>,
}

impl AppState {
    /// Create a new AppState from configuration and an optional credential
    pub fn new(config: Config, api_key: Option<ApiKey>) -> Self {
        let upstream = Arc::new(UpstreamClient::new(config.upstream.clone()));
        Self {
            config: Arc::new(config),
            api_key: api_key.map(Arc::new),
            upstream,
        }
    }

    /// Create a new AppState, reading the credential from the environment
    /// variable named by `upstream.api_key_env`
    pub fn from_env(config: Config) -> Self {
        let api_key = ApiKey::from_env(config.upstream.api_key_env());
        Self::new(config, api_key)
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Upstream credential, if this deployment has one
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_deref()
    }

    /// Get reference to the upstream client
    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}

/// Build the full application router with all middleware applied
///
/// Request IDs and tracing wrap the CORS layers, so preflights answered by
/// CORS are traced and carry `x-request-id` too.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config().server.max_body_bytes;

    Router::new()
        .route("/", get(health::handler))
        .route("/v1/chat/completions", post(completions::handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors::cors_layer())
        .layer(middleware::from_fn(cors::preflight_no_content))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
