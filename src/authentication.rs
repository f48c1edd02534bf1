use std::sync::Arc;

use crate::{db_helpers::get_active_session_in_db, errors::RequestError, AppState};
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;

pub const AUTH_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaim {
    pub id: i64,
    pub sid: String,
    pub exp: i64,
}

/// The signed-in caller. Only produced for a valid token whose session is still active.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub session_id: String,
    pub expires_at: i64,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    UserUpdated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user_id: i64,
    pub at: i64,
}

impl AuthEvent {
    pub fn now(kind: AuthEventKind, user_id: i64) -> Self {
        AuthEvent {
            kind,
            user_id,
            at: OffsetDateTime::now_utc().unix_timestamp(),
        }
    }
}

pub fn auth_event_channel() -> broadcast::Sender<AuthEvent> {
    let (sender, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
    sender
}

/// Send `event` to every listener. Having no listeners is fine.
pub fn publish_auth_event(events: &broadcast::Sender<AuthEvent>, event: AuthEvent) {
    tracing::debug!("Auth event {:?} for user {}", event.kind, event.user_id);
    let _ = events.send(event);
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let state = match parts.extensions.get::<Arc<AppState>>() {
            Some(state) => state.clone(),
            None => {
                tracing::error!("Application state missing from request extensions");
                return Err(RequestError::ServerError);
            }
        };

        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Err(RequestError::NotAuthorized("Not signed in")),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => {
                tracing::debug!("Authorization header is not valid UTF-8");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let token = match header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("Token "))
        {
            Some(token) => token.trim(),
            None => {
                tracing::debug!("Authorization header without a known scheme");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let claim = verify_jwt_token(token, &state.config.jwt_secret)?;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let session = get_active_session_in_db(&state.pool, &claim.sid, claim.id, now).await?;
        match session {
            Some(session) => Ok(AuthUser {
                id: session.user_id,
                session_id: session.id,
                expires_at: session.expires_at,
                token: token.to_string(),
            }),
            None => Err(RequestError::NotAuthorized("Session expired")),
        }
    }
}

/// Unix timestamp `ttl_days` from now.
pub fn session_expiry(ttl_days: i64) -> i64 {
    (OffsetDateTime::now_utc() + time::Duration::days(ttl_days)).unix_timestamp()
}

pub fn get_jwt_token(id: i64, session_id: &str, expires_at: i64, secret: &str) -> Result<String> {
    let claim = AuthClaim {
        id,
        sid: session_id.to_string(),
        exp: expires_at,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(token: &str, secret: &str) -> Result<AuthClaim, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Error verifying token: {}", e);
        RequestError::NotAuthorized("Invalid token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(claim)
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}
