use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::{ai::AiError, storage::StorageError, JsonResponse};

#[derive(Debug)]
pub enum RequestError {
    NotFound(&'static str),
    NotAuthorized(&'static str),
    Forbidden,
    Validation(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Upstream(String),
    Storage(StorageError),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl From<StorageError> for RequestError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<AiError> for RequestError {
    fn from(value: AiError) -> Self {
        match value {
            AiError::EmptyPrompt => Self::Validation(AiError::EmptyPrompt.to_string()),
            other => Self::Upstream(crate::ai::friendly_message(&other.to_string())),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    /// Whether this wraps a UNIQUE constraint violation from the database.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RequestError::DatabaseError(sqlx::Error::Database(e)) => {
                e.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let (status_code, json) = match self {
            RequestError::NotFound(message) => {
                (StatusCode::NOT_FOUND, RequestErrorJsonWrapper::new(message))
            }
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Forbidden => (
                StatusCode::FORBIDDEN,
                RequestErrorJsonWrapper::new("Forbidden"),
            ),
            RequestError::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, RequestErrorJsonWrapper::new(message))
            }
            RequestError::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Upstream(message) => {
                tracing::error!("Upstream error: {}", message);
                (StatusCode::BAD_GATEWAY, RequestErrorJsonWrapper::new(message))
            }
            RequestError::Storage(e) => {
                let status = match e {
                    StorageError::BucketNotFound(_) | StorageError::ObjectNotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    StorageError::AlreadyExists(_) => StatusCode::CONFLICT,
                    StorageError::InvalidPath(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    StorageError::Io(io) => {
                        tracing::error!("Storage error: {}", io);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(RequestErrorJsonWrapper::new("Internal Server Error")),
                        );
                    }
                };
                (status, RequestErrorJsonWrapper::new(&e.to_string()))
            }
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJsonWrapper::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJsonWrapper::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }
}
