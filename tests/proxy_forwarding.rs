//! Integration tests for forwarding to the upstream provider
//!
//! Uses wiremock as the upstream chat-completions endpoint to verify the
//! outgoing request (auth header, injected model and token budget, verbatim
//! messages) and the pass-through of status, body and content type.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chat_proxy::{
    config::{Config, UpstreamConfig},
    handlers::{self, AppState},
    upstream::ApiKey,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn create_test_app(upstream: &MockServer) -> Router {
    let config = Config {
        upstream: UpstreamConfig::default().with_url(format!("{}{}", upstream.uri(), COMPLETIONS_PATH)),
        ..Config::default()
    };
    handlers::router(AppState::new(config, ApiKey::new("test-key")))
}

fn completions_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(COMPLETIONS_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_forwards_exactly_one_request_with_injected_fields() {
    let upstream = MockServer::start().await;
    let upstream_body = json!({
        "id": "chatcmpl-123",
        "choices": [{ "message": { "content": "Hello!" } }]
    });

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header_eq("authorization", "Bearer test-key"))
        .and(header_eq("content-type", "application/json"))
        .and(body_json(json!({
            "model": "gpt-5-mini",
            "messages": [{ "role": "user", "content": "Hello" }],
            "max_completion_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({
            "messages": [{ "role": "user", "content": "Hello" }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body, upstream_body);
}

#[tokio::test]
async fn test_inbound_model_and_limits_are_replaced() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_json(json!({
            "model": "gpt-5-mini",
            "messages": [{ "role": "user", "content": "Test" }],
            "max_completion_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "Test" }],
            "max_tokens": 10,
            "temperature": 0.2
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_messages_order_is_preserved() {
    let upstream = MockServer::start().await;
    let messages = json!([
        { "role": "system", "content": "You are helpful." },
        { "role": "user", "content": "Hi" },
        { "role": "assistant", "content": "Hello!" },
        { "role": "user", "content": "How are you?" }
    ]);

    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "gpt-5-mini",
            "messages": messages.clone(),
            "max_completion_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({ "messages": messages })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_messages_are_forwarded() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "gpt-5-mini",
            "messages": [],
            "max_completion_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_configured_model_and_budget_are_used() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [],
            "max_completion_tokens": 256
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&upstream)
        .await;

    let config: Config = format!(
        r#"
[upstream]
url = "{}{}"
model = "gpt-4o-mini"
max_completion_tokens = 256
"#,
        upstream.uri(),
        COMPLETIONS_PATH
    )
    .parse()
    .expect("should parse config");
    let app = handlers::router(AppState::new(config, ApiKey::new("test-key")));

    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// -------------------------------------------------------------------------
// Pass-through of upstream responses
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_rate_limit_is_passed_through_without_retry() {
    let upstream = MockServer::start().await;
    let error_body = r#"{"error": "Rate limit exceeded"}"#;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("content-type", "application/json")
                .set_body_string(error_body),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({
            "messages": [{ "role": "user", "content": "Hello" }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_bytes(response).await, error_body.as_bytes());
}

#[tokio::test]
async fn test_upstream_server_errors_are_not_translated() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(response).await, b"upstream overloaded");
}

#[tokio::test]
async fn test_upstream_content_type_is_relayed() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("data: {}\n\n", "text/event-stream"),
        )
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(body_bytes(response).await, b"data: {}\n\n");
}

#[tokio::test]
async fn test_missing_upstream_content_type_defaults_to_json() {
    let upstream = MockServer::start().await;

    // set_body_bytes does not add a content type
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"{}".to_vec()))
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
}

#[tokio::test]
async fn test_forwarded_responses_carry_cors_and_request_id() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("{}"))
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let mut request = completions_request(json!({ "messages": [] }));
    request
        .headers_mut()
        .insert(header::ORIGIN, "https://app.example.com".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert!(response.headers().contains_key("x-request-id"));
}

// -------------------------------------------------------------------------
// Upstream unreachable
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_unreachable_upstream_returns_bad_gateway() {
    // Grab a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config {
        upstream: UpstreamConfig::default()
            .with_url(format!("http://127.0.0.1:{}{}", port, COMPLETIONS_PATH)),
        ..Config::default()
    };
    let app = handlers::router(AppState::new(config, ApiKey::new("test-key")));

    let response = app
        .oneshot(completions_request(json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let message = body["error"].as_str().expect("error should be a string");
    assert!(
        message.starts_with("Upstream request failed"),
        "unexpected error message: {}",
        message
    );
}

#[tokio::test]
async fn test_body_larger_than_two_mebibytes_is_forwarded() {
    let upstream = MockServer::start().await;
    let content = "x".repeat(3 * 1024 * 1024);

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_json(json!({
            "model": "gpt-5-mini",
            "messages": [{ "role": "user", "content": content }],
            "max_completion_tokens": 2000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = create_test_app(&upstream);
    let response = app
        .oneshot(completions_request(json!({
            "messages": [{ "role": "user", "content": content }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
