//! Integration tests for profiles and the admin todo list.

mod common;

use common::{error_message, spawn_app, TestApp};
use serde_json::{json, Value};

async fn send_todo(app: &TestApp, token: &str, title: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/admin/todos"))
        .bearer_auth(token)
        .json(&json!({ "title": title }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_profile_exists_after_login() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .get(app.url("/api/admin/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let id = body["profile"]["id"].as_i64().unwrap();
    assert_eq!(body["profile"]["display_name"], Value::Null);

    let response = app
        .client
        .get(app.url(&format!("/api/profiles/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .client
        .get(app.url("/api/profiles/4242"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_profile_partial_update() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .put(app.url("/api/admin/profile"))
        .bearer_auth(&token)
        .json(&json!({
            "display_name": "Ada Lovelace",
            "youtube_url": "https://youtube.com/@ada",
            "twitter_url": "https://twitter.com/ada",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["profile"]["display_name"], "Ada Lovelace");
    assert_eq!(body["profile"]["youtube_url"], "https://youtube.com/@ada");

    let response = app
        .client
        .put(app.url("/api/admin/profile"))
        .bearer_auth(&token)
        .json(&json!({ "twitter_url": "" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["profile"]["twitter_url"], Value::Null);
    assert_eq!(body["profile"]["display_name"], "Ada Lovelace");
    assert_eq!(body["profile"]["youtube_url"], "https://youtube.com/@ada");
}

#[tokio::test]
async fn test_todo_lifecycle() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = send_todo(&app, &token, "  Write the launch post ").await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let id = body["todo"]["id"].as_i64().unwrap();
    assert_eq!(body["todo"]["title"], "Write the launch post");
    assert_eq!(body["todo"]["is_completed"], false);
    send_todo(&app, &token, "Second").await;

    let response = app
        .client
        .patch(app.url(&format!("/api/admin/todos/{id}/toggle")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["todo"]["is_completed"], true);

    let response = app
        .client
        .get(app.url("/api/admin/todos"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let todos = body["todos"].as_array().unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0]["title"], "Second");

    let response = app
        .client
        .get(app.url("/api/admin/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_todos"], 2);
    assert_eq!(body["completed_todos"], 1);

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/todos/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/todos/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_todo_validation_and_ownership() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = send_todo(&app, &token, "   ").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(error_message(&body), "Todo title is required");

    let body: Value = send_todo(&app, &token, "Private").await.json().await.unwrap();
    let id = body["todo"]["id"].as_i64().unwrap();
    let other = app.other_author_token().await;

    let response = app
        .client
        .patch(app.url(&format!("/api/admin/todos/{id}/toggle")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
