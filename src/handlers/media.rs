use std::sync::Arc;

use axum::{
    extract::Multipart,
    http::StatusCode,
    Extension, Json,
};

use crate::{
    authentication::AuthUser,
    data_formats::{MediaListWrapper, MediaProbeResponse, MediaQueryParams, MediaUploadResponse},
    errors::RequestError,
    storage::{sanitize_file_name, ObjectInfo, MEDIA_BUCKET},
    AppState, JsonResponse,
};

use super::{ensure_image, read_upload, ApiQuery, JsonResult};

const FEATURED_FOLDER: &str = "featured";
const CONTENT_FOLDER: &str = "content";

// ----------------- Media Handlers -----------------
pub async fn list_media(
    Extension(state): Extension<Arc<AppState>>,
    _auth: AuthUser,
    ApiQuery(params): ApiQuery<MediaQueryParams>,
) -> JsonResult<MediaListWrapper<ObjectInfo>> {
    let objects = state
        .storage
        .list(MEDIA_BUCKET, params.prefix.as_deref())
        .await?;
    Ok(Json(MediaListWrapper { objects }))
}

pub async fn upload_featured_image(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<JsonResponse<MediaUploadResponse>, RequestError> {
    upload_media(&state, auth, multipart, FEATURED_FOLDER).await
}

pub async fn upload_content_image(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<JsonResponse<MediaUploadResponse>, RequestError> {
    upload_media(&state, auth, multipart, CONTENT_FOLDER).await
}

/// Check the media bucket is there and writable before the editor uploads.
pub async fn probe_media(
    Extension(state): Extension<Arc<AppState>>,
    _auth: AuthUser,
) -> JsonResult<MediaProbeResponse> {
    state.storage.probe(MEDIA_BUCKET).await.map_err(|e| {
        tracing::error!("Media bucket probe failed: {}", e);
        e
    })?;
    Ok(Json(MediaProbeResponse {
        bucket: MEDIA_BUCKET.to_string(),
        writable: true,
    }))
}

async fn upload_media(
    state: &AppState,
    auth: AuthUser,
    multipart: Multipart,
    folder: &str,
) -> Result<JsonResponse<MediaUploadResponse>, RequestError> {
    let file = read_upload(multipart, state.config.max_media_bytes).await?;
    ensure_image(&file)?;

    let path = format!(
        "{folder}/{}-{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(&file.file_name)
    );
    state
        .storage
        .upload(MEDIA_BUCKET, &path, &file.bytes, false)
        .await
        .map_err(|e| {
            tracing::error!("Error uploading {}: {}", path, e);
            e
        })?;
    tracing::info!("User {} uploaded {} ({} bytes)", auth.id, path, file.bytes.len());

    Ok((
        StatusCode::CREATED,
        Json(MediaUploadResponse {
            bucket: MEDIA_BUCKET.to_string(),
            url: state.storage.public_url(MEDIA_BUCKET, &path),
            path,
        }),
    ))
}
