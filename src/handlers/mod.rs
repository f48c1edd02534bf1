use axum::{
    async_trait,
    body::Bytes,
    extract::{multipart::MultipartError, FromRequestParts, Multipart, Query},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::RequestError;

mod auth;
mod editor;
mod media;
mod posts;
mod profiles;
mod status;
mod todos;

pub use auth::*;
pub use editor::*;
pub use media::*;
pub use posts::*;
pub use profiles::*;
pub use status::*;
pub use todos::*;

type JsonResult<T> = Result<Json<T>, RequestError>;

/// `Query` whose rejection uses the JSON error body of every other endpoint.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| RequestError::BadRequest(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

impl UploadedFile {
    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|content_type| content_type.starts_with("image/"))
            .unwrap_or(false)
    }
}

/// Read the `file` part of a multipart upload, refusing anything over `limit` bytes.
///
/// The part is read chunk by chunk so an oversized file is refused as soon as
/// it passes `limit`, before the request body limit cuts the stream.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<UploadedFile, RequestError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("file").to_string();
        let content_type = field.content_type().map(str::to_string);

        let mut buffer = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| upload_error(e, limit))? {
            if buffer.len() + chunk.len() > limit {
                tracing::warn!("Upload {} is over the {} byte limit", file_name, limit);
                return Err(too_large(limit));
            }
            buffer.extend_from_slice(&chunk);
        }
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes: Bytes::from(buffer),
        });
    }
    Err(RequestError::Validation("No file was uploaded".to_string()))
}

fn too_large(limit: usize) -> RequestError {
    RequestError::PayloadTooLarge(format!(
        "Image must be less than {}MB",
        limit / (1024 * 1024)
    ))
}

fn upload_error(error: MultipartError, limit: usize) -> RequestError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(limit);
    }
    tracing::warn!("Failed to read multipart body: {}", error);
    RequestError::Validation(format!("Invalid upload: {}", error.body_text()))
}

fn ensure_image(file: &UploadedFile) -> Result<(), RequestError> {
    if file.is_image() {
        Ok(())
    } else {
        Err(RequestError::Validation(
            "Please select an image file".to_string(),
        ))
    }
}
