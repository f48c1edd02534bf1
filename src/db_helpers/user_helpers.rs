use sqlx::SqlitePool;

use crate::{
    errors::RequestError,
    models::{Session, User},
};

use super::get_user_by_id;

// ----------------- User Queries -----------------

pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password)
        VALUES ($1, $2)
        RETURNING id, email, password, created_at
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn update_user_email_in_db(
    pool: &SqlitePool,
    id: i64,
    email: &str,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE users SET email = $1 WHERE id = $2
        "#,
    )
    .bind(email)
    .bind(id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("User not found"));
    }
    tx.commit().await?;

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}

// ----------------- Session Queries -----------------

pub async fn create_session_in_db(
    pool: &SqlitePool,
    user_id: i64,
    expires_at: i64,
) -> Result<Session, RequestError> {
    let mut tx = pool.begin().await?;
    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, created_at, expires_at, revoked_at
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(session)
}

/// The session, if it belongs to `user_id`, is not revoked and has not expired at `now`.
pub async fn get_active_session_in_db(
    pool: &SqlitePool,
    session_id: &str,
    user_id: i64,
    now: i64,
) -> Result<Option<Session>, RequestError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, created_at, expires_at, revoked_at FROM sessions
        WHERE id = $1 AND user_id = $2 AND revoked_at IS NULL AND expires_at > $3
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

pub async fn revoke_session_in_db(pool: &SqlitePool, session_id: &str) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE sessions SET revoked_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND revoked_at IS NULL
        "#,
    )
    .bind(session_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}
