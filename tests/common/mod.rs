#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use portfolio_blog::{
    ai::{GeminiClient, TextGenerator},
    build_state_with_generator,
    config::{Config, LogFormat},
    create_admin, get_random_free_port, run_app, AppState,
};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const SPA_INDEX: &str = "<!doctype html><html><body><div id=\"root\">portfolio spa</div></body></html>";

/// A PNG signature followed by filler; the server only looks at the declared type.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub state: Arc<AppState>,
    pub dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_ai(None).await
}

/// Start a server on a free port with its own database, storage and static files.
/// `ai_url` points the Gemini client at a mock; without it no API key is configured.
pub async fn spawn_app_with_ai(ai_url: Option<String>) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let static_dir = dir.path().join("dist");
    std::fs::create_dir_all(static_dir.join("assets")).expect("Failed to create static dir");
    std::fs::write(static_dir.join("index.html"), SPA_INDEX).expect("Failed to write index");
    std::fs::write(static_dir.join("assets/app.js"), "console.log('app');")
        .expect("Failed to write asset");

    let (_, addr) = get_random_free_port();
    let address = format!("http://{addr}");
    let config = Config {
        database_url: format!("sqlite://{}", dir.path().join("test.db").display()),
        jwt_secret: "integration-test-secret".to_string(),
        session_ttl_days: 7,
        host: addr.ip().to_string(),
        port: addr.port(),
        static_dir,
        public_base_url: address.clone(),
        storage_dir: dir.path().join("storage"),
        max_media_bytes: 5 * 1024 * 1024,
        max_avatar_bytes: 2 * 1024 * 1024,
        gemini_api_key: ai_url.as_ref().map(|_| "test-key".to_string()),
        gemini_api_url: ai_url.unwrap_or_else(|| "http://127.0.0.1:9".to_string()),
        log_format: LogFormat::Pretty,
    };

    let ai: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_api_url,
    ));
    let state = build_state_with_generator(config, ai)
        .await
        .expect("Failed to build state");
    create_admin(&state.pool, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to create admin");

    tokio::spawn(run_app(state.clone(), addr));

    let app = TestApp {
        address,
        client: reqwest::Client::new(),
        state,
        dir,
    };
    app.wait_until_ready().await;
    app
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.dir.path().join("storage")
    }

    async fn wait_until_ready(&self) {
        for _ in 0..100 {
            if let Ok(response) = self.client.get(self.url("/check_health")).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Server did not start");
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Invalid login body");
        body["session"]["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// A second author with their own session.
    pub async fn other_author_token(&self) -> String {
        create_admin(&self.state.pool, "other@example.com", "another password")
            .await
            .expect("Failed to create second author");
        self.token_for("other@example.com", "another password").await
    }

    pub async fn create_post(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/admin/posts"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to create post")
    }

    pub async fn create_post_json(&self, token: &str, body: Value) -> Value {
        let response = self.create_post(token, body).await;
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Invalid post body");
        body["post"].clone()
    }

    pub async fn upload(
        &self,
        token: &str,
        path: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> reqwest::Response {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Invalid mime type");
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .expect("Failed to upload")
    }
}

pub fn error_message(body: &Value) -> &str {
    body["errors"]["body"][0].as_str().unwrap_or_default()
}
