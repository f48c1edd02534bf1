use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    Extension, Json,
};

use crate::{
    authentication::AuthUser,
    data_formats::{ProfileWrapper, UpdateProfileRequest},
    db_helpers::{
        ensure_profile_in_db, get_profile_by_id_in_db, set_avatar_url_in_db,
        update_profile_in_db,
    },
    storage::{file_extension, AVATARS_BUCKET},
    AppState,
};

use super::{ensure_image, read_upload, JsonResult};

// ----------------- Profile Handlers -----------------
pub async fn get_public_profile(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> JsonResult<ProfileWrapper> {
    let profile = get_profile_by_id_in_db(&state.pool, id).await?;
    Ok(Json(ProfileWrapper {
        profile: profile.into(),
    }))
}

pub async fn get_own_profile(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> JsonResult<ProfileWrapper> {
    ensure_profile_in_db(&state.pool, auth.id).await?;
    let profile = get_profile_by_id_in_db(&state.pool, auth.id).await?;
    Ok(Json(ProfileWrapper {
        profile: profile.into(),
    }))
}

pub async fn update_own_profile(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> JsonResult<ProfileWrapper> {
    let profile = update_profile_in_db(&state.pool, auth.id, request).await?;
    tracing::info!("User {} updated their profile", auth.id);
    Ok(Json(ProfileWrapper {
        profile: profile.into(),
    }))
}

pub async fn upload_avatar(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> JsonResult<ProfileWrapper> {
    let file = read_upload(multipart, state.config.max_avatar_bytes).await?;
    ensure_image(&file)?;

    let extension = file_extension(&file.file_name)
        .or_else(|| {
            file.content_type
                .as_deref()
                .and_then(|content_type| content_type.strip_prefix("image/"))
                .and_then(file_extension_from_subtype)
        })
        .unwrap_or_else(|| "png".to_string());
    let path = format!("{}/{}.{}", auth.id, uuid::Uuid::new_v4(), extension);

    state
        .storage
        .upload(AVATARS_BUCKET, &path, &file.bytes, true)
        .await
        .map_err(|e| {
            tracing::error!("Error uploading avatar for user {}: {}", auth.id, e);
            e
        })?;
    let url = state.storage.public_url(AVATARS_BUCKET, &path);
    let profile = set_avatar_url_in_db(&state.pool, auth.id, &url).await?;
    tracing::info!("User {} uploaded avatar {}", auth.id, path);

    Ok(Json(ProfileWrapper {
        profile: profile.into(),
    }))
}

fn file_extension_from_subtype(subtype: &str) -> Option<String> {
    let subtype = subtype.split('+').next().unwrap_or(subtype);
    file_extension(&format!("file.{subtype}"))
}
