use std::sync::Arc;

use axum::{
    body::{boxed, Body},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    data_formats::ServerStatusResponse,
    errors::RequestError,
    utils::{format_megabytes, read_memory_usage},
    AppState,
};

const UNAVAILABLE: &str = "unavailable";

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn server_status(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<ServerStatusResponse> {
    let uptime = format!("{} seconds", state.started_at.elapsed().as_secs());
    let response = match read_memory_usage() {
        Some(usage) => ServerStatusResponse {
            rss: format_megabytes(usage.rss),
            virtual_memory: format_megabytes(usage.virtual_memory),
            data_segment: format_megabytes(usage.data_segment),
            peak_rss: format_megabytes(usage.peak_rss),
            uptime,
        },
        None => ServerStatusResponse {
            rss: UNAVAILABLE.to_string(),
            virtual_memory: UNAVAILABLE.to_string(),
            data_segment: UNAVAILABLE.to_string(),
            peak_rss: UNAVAILABLE.to_string(),
            uptime,
        },
    };
    Json(response)
}

/// Serve the single-page app: real files from the static directory, `index.html` for
/// every other path. Unknown API paths get a JSON 404 instead.
pub async fn spa_fallback(
    Extension(state): Extension<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path();
    if path == "/api" || path.starts_with("/api/") {
        tracing::debug!("No API route for {}", path);
        return RequestError::NotFound("Route not found").into_response();
    }

    let static_dir = &state.config.static_dir;
    let service =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    match service.oneshot(request).await {
        Ok(response) => response.map(boxed),
        Err(e) => {
            tracing::error!("Failed to serve static file: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
