//! Integration tests for the editor helpers: HTML conversion and AI drafting.

mod common;

use common::{error_message, spawn_app, spawn_app_with_ai, TestApp};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn generate(app: &TestApp, token: &str, prompt: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/admin/ai/generate"))
        .bearer_auth(token)
        .json(&json!({ "prompt": prompt }))
        .send()
        .await
        .unwrap()
}

fn model_not_found(model: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {
            "code": 404,
            "message": format!("models/{model} is not found for API version v1beta"),
            "status": "NOT_FOUND",
        }
    }))
}

#[tokio::test]
async fn test_html_to_markdown_endpoint() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/editor/markdown"))
        .bearer_auth(&token)
        .json(&json!({
            "html": "<h1>Title</h1><p>Some <strong>bold</strong> text</p><ul>\n<li>one</li>\n</ul>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["markdown"], "# Title\n\nSome **bold** text\n\n\n- one");
}

#[tokio::test]
async fn test_markdown_to_html_endpoint() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/editor/html"))
        .bearer_auth(&token)
        .json(&json!({ "markdown": "## Notes\n\n- one\n- [two](https://x.dev)" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["html"],
        "<h2>Notes</h2>\n<ul>\n<li>one</li>\n<li><a href=\"https://x.dev\">two</a></li>\n</ul>\n"
    );

    let response = app
        .client
        .post(app.url("/api/admin/editor/html"))
        .json(&json!({ "markdown": "# x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_generation_falls_through_to_next_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .respond_with(model_not_found("gemini-1.5-pro"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "# Rust\n\n" }, { "text": "Ownership rules." }]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = spawn_app_with_ai(Some(server.uri())).await;
    let token = app.admin_token().await;

    let response = generate(&app, &token, "write about rust").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["model"], "gemini-2.0-flash");
    assert_eq!(body["markdown"], "# Rust\n\nOwnership rules.");
    assert_eq!(body["html"], "<h1>Rust</h1>\n<p>Ownership rules.</p>\n");
}

#[tokio::test]
async fn test_generation_reports_friendly_error_when_every_model_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/[^/]+:generateContent$"))
        .respond_with(model_not_found("any"))
        .mount(&server)
        .await;

    let app = spawn_app_with_ai(Some(server.uri())).await;
    let token = app.admin_token().await;

    let response = generate(&app, &token, "write about rust").await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(error_message(&body).starts_with("The Gemini model is not available"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 6);
    assert!(requests.iter().all(|request| request.url.query().is_none()));
}

#[tokio::test]
async fn test_generation_needs_a_prompt() {
    let server = MockServer::start().await;
    let app = spawn_app_with_ai(Some(server.uri())).await;
    let token = app.admin_token().await;

    let response = generate(&app, &token, "   ").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        error_message(&body),
        "Please enter a prompt for the AI to generate content."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_without_api_key() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = generate(&app, &token, "write about rust").await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(error_message(&body).starts_with("Invalid or missing API key"));
}
