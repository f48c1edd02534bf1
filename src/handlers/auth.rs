use std::{convert::Infallible, sync::Arc};

use axum::{
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Extension, Json,
};
use time::OffsetDateTime;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    authentication::{
        get_jwt_token, publish_auth_event, session_expiry, verify_password_argon2, AuthEvent,
        AuthEventKind, AuthUser,
    },
    data_formats::{
        LoginRequest, SessionResponse, SessionWrapper, UpdateEmailRequest, UserResponse,
        UserWrapper,
    },
    db_helpers::{
        create_session_in_db, ensure_profile_in_db, get_active_session_in_db, get_user_by_email, get_user_by_id,
        revoke_session_in_db, update_user_email_in_db,
    },
    errors::RequestError,
    AppState,
};

use super::JsonResult;

type SessionJson = SessionWrapper<SessionResponse>;
type UserJson = UserWrapper<UserResponse>;

// ----------------- Session Handlers -----------------
pub async fn login_user(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<SessionJson> {
    let email = request.email.trim().to_lowercase();
    let user = match get_user_by_email(&state.pool, &email).await? {
        Some(user) => user,
        None => {
            tracing::info!("Sign in attempt for unknown email");
            return Err(RequestError::NotAuthorized("Invalid login credentials"));
        }
    };

    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|e| {
            tracing::error!("Could not verify password: {:#}", e);
            RequestError::ServerError
        })?;
    if !is_password_correct {
        tracing::info!("Incorrect password for user {}", user.id);
        return Err(RequestError::NotAuthorized("Invalid login credentials"));
    }

    let expires_at = session_expiry(state.config.session_ttl_days);
    let session = create_session_in_db(&state.pool, user.id, expires_at).await?;
    ensure_profile_in_db(&state.pool, user.id).await?;
    let token = get_jwt_token(user.id, &session.id, expires_at, &state.config.jwt_secret)
        .map_err(|e| {
            tracing::error!("{:#}", e);
            RequestError::ServerError
        })?;

    tracing::info!("User {} signed in", user.id);
    publish_auth_event(&state.events, AuthEvent::now(AuthEventKind::SignedIn, user.id));

    Ok(Json(SessionWrapper {
        session: SessionResponse {
            user: user.into(),
            token,
            expires_at,
        },
    }))
}

pub async fn logout_user(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> Result<StatusCode, RequestError> {
    revoke_session_in_db(&state.pool, &auth.session_id).await?;
    tracing::info!("User {} signed out", auth.id);
    publish_auth_event(&state.events, AuthEvent::now(AuthEventKind::SignedOut, auth.id));
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> JsonResult<SessionJson> {
    let user = get_user_by_id(&state.pool, auth.id)
        .await?
        .ok_or(RequestError::NotAuthorized("Session expired"))?;
    Ok(Json(SessionWrapper {
        session: SessionResponse {
            user: user.into(),
            token: auth.token,
            expires_at: auth.expires_at,
        },
    }))
}

// ----------------- User Handlers -----------------
pub async fn update_email(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<UpdateEmailRequest>,
) -> JsonResult<UserJson> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(RequestError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    if let Some(existing) = get_user_by_email(&state.pool, &email).await? {
        if existing.id != auth.id {
            return Err(RequestError::Validation("Email already in use".to_string()));
        }
    }

    let user = update_user_email_in_db(&state.pool, auth.id, &email)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                RequestError::Validation("Email already in use".to_string())
            } else {
                e
            }
        })?;

    publish_auth_event(&state.events, AuthEvent::now(AuthEventKind::UserUpdated, auth.id));
    Ok(Json(UserWrapper::wrap_with_user_data(user.into())))
}

/// Server-sent stream of the caller's own auth events.
///
/// The stream ends after delivering the `SIGNED_OUT` event that revoked its
/// own session.
pub async fn auth_events(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> impl IntoResponse {
    let mut receiver = state.events.subscribe();
    let user_id = auth.id;
    let session_id = auth.session_id;
    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) if event.user_id == user_id => {
                    let signed_out = event.kind == AuthEventKind::SignedOut;
                    match Event::default().event("auth").json_data(&event) {
                        Ok(sse_event) => yield Ok::<Event, Infallible>(sse_event),
                        Err(e) => tracing::warn!("Could not encode auth event: {}", e),
                    }
                    if signed_out && !session_is_active(&state, &session_id, user_id).await {
                        tracing::debug!("Closing auth event stream for session {}", session_id);
                        break;
                    }
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth event listener lagged by {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn session_is_active(state: &AppState, session_id: &str, user_id: i64) -> bool {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    match get_active_session_in_db(&state.pool, session_id, user_id, now).await {
        Ok(session) => session.is_some(),
        Err(e) => {
            tracing::warn!("Could not check session {}: {:?}", session_id, e);
            false
        }
    }
}
