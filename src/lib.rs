mod authentication;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;

pub mod ai;
pub mod config;
pub mod logging;
pub mod markdown;
pub mod particles;
pub mod storage;
pub mod utils;

use anyhow::Context;
pub use anyhow::Result;
pub use authentication::{AuthEvent, AuthEventKind};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use errors::{RequestErrorJson, RequestErrorJsonWrapper};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
    time::Instant,
};
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::ai::{GeminiClient, TextGenerator};
use crate::storage::{MediaStore, PUBLIC_PREFIX};

pub type JsonResponse<T> = (StatusCode, Json<T>);

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

/// Everything a handler can reach, shared behind one `Arc`.
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub storage: MediaStore,
    pub ai: Arc<dyn TextGenerator>,
    pub events: broadcast::Sender<AuthEvent>,
    pub started_at: Instant,
}

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let db_url = &config.database_url;
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {db_url}"))?;
    } else {
        tracing::debug!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

/// Open the database and storage and wire up the Gemini client from `config`.
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let ai = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_api_url,
    ));
    build_state_with_generator(config, ai).await
}

pub async fn build_state_with_generator(
    config: Config,
    ai: Arc<dyn TextGenerator>,
) -> Result<Arc<AppState>> {
    let pool = init_db(&config).await?;
    let storage = MediaStore::new(&config.storage_dir, &config.public_base_url);
    storage
        .ensure_buckets()
        .await
        .context("Failed to create storage buckets")?;
    if !ai.is_configured() {
        tracing::warn!("GEMINI_API_KEY is not set, AI generation is disabled");
    }

    Ok(Arc::new(AppState {
        pool,
        config,
        storage,
        ai,
        events: authentication::auth_event_channel(),
        started_at: Instant::now(),
    }))
}

pub async fn run_app(state: Arc<AppState>, address: SocketAddr) -> Result<()> {
    let app = make_router(state);
    tracing::info!("Server listening on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").expect("Could not bind to a free port");
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

/// Insert an administrator account, or reset the password of an existing one.
pub async fn create_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<i64> {
    let email = email.trim().to_lowercase();
    anyhow::ensure!(email.contains('@'), "{email} is not an email address");
    anyhow::ensure!(password.len() >= 8, "Password must be at least 8 characters");

    let hash = authentication::hash_password_argon2(password.to_string()).await?;
    let id = match db_helpers::get_user_by_email(pool, &email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to look up user: {e:?}"))?
    {
        Some(user) => {
            sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
                .bind(&hash)
                .bind(user.id)
                .execute(pool)
                .await?;
            user.id
        }
        None => {
            db_helpers::insert_user(pool, &email, &hash)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create user: {e:?}"))?
                .id
        }
    };
    db_helpers::ensure_profile_in_db(pool, id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create profile: {e:?}"))?;
    Ok(id)
}

pub fn make_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_media_bytes
        .max(state.config.max_avatar_bytes)
        + BODY_LIMIT_OVERHEAD;

    let api = Router::new()
        .route("/auth/login", post(login_user))
        .route("/auth/logout", post(logout_user))
        .route("/auth/session", get(get_session))
        .route("/auth/user", put(update_email))
        .route("/auth/events", get(auth_events))
        .route("/posts", get(list_posts))
        .route("/posts/recent", get(recent_posts))
        .route("/posts/categories", get(list_categories))
        .route("/posts/:slug", get(get_post_by_slug))
        .route("/profiles/:id", get(get_public_profile))
        .route("/admin/stats", get(get_stats))
        .route("/admin/posts", get(list_own_posts).post(create_post))
        .route(
            "/admin/posts/:id",
            get(get_own_post).put(update_post).delete(delete_post),
        )
        .route("/admin/profile", get(get_own_profile).put(update_own_profile))
        .route("/admin/profile/avatar", post(upload_avatar))
        .route("/admin/todos", get(list_todos).post(create_todo))
        .route("/admin/todos/:id/toggle", patch(toggle_todo))
        .route("/admin/todos/:id", delete(delete_todo))
        .route("/admin/media", get(list_media))
        .route("/admin/media/featured", post(upload_featured_image))
        .route("/admin/media/content", post(upload_content_image))
        .route("/admin/media/probe", get(probe_media))
        .route("/admin/editor/markdown", post(convert_html))
        .route("/admin/editor/html", post(render_markdown))
        .route("/admin/ai/generate", post(generate_content));

    let storage = ServeDir::new(state.storage.root());

    Router::new()
        .route("/check_health", get(alive))
        .route("/server-status", get(server_status))
        .nest("/api", api)
        .nest_service(PUBLIC_PREFIX, storage)
        .fallback(spa_fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
