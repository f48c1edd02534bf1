use sqlx::SqlitePool;

use crate::{data_formats::UpdateProfileRequest, errors::RequestError, models::Profile};

use super::QueryBuilder;

const PROFILE_QUERY: &str = r#"
        SELECT id, display_name, avatar_url, youtube_url, instagram_url,
               twitter_url, facebook_url, updated_at
        FROM profiles WHERE id = $1
"#;

/// Create an empty profile for `user_id` unless one exists.
pub async fn ensure_profile_in_db(pool: &SqlitePool, user_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO profiles (id) VALUES ($1)
        "#,
    )
    .bind(user_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn get_profile_by_id_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Profile, RequestError> {
    let profile = sqlx::query_as::<_, Profile>(PROFILE_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match profile {
        Some(profile) => Ok(profile),
        None => Err(RequestError::NotFound("Profile not found")),
    }
}

pub async fn update_profile_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        display_name,
        youtube_url,
        instagram_url,
        twitter_url,
        facebook_url,
    }: UpdateProfileRequest,
) -> Result<Profile, RequestError> {
    ensure_profile_in_db(pool, id).await?;

    let built = QueryBuilder::new("UPDATE profiles SET ".to_owned(), Some(", "))
        .add_param("display_name", display_name)
        .add_param("youtube_url", youtube_url)
        .add_param("instagram_url", instagram_url)
        .add_param("twitter_url", twitter_url)
        .add_param("facebook_url", facebook_url)
        .build();

    if let Some((query, params)) = built {
        let query = format!(
            "{query}, updated_at = CURRENT_TIMESTAMP WHERE id = ${}",
            params.len() + 1
        );
        let mut tx = pool.begin().await?;
        let mut update = sqlx::query(&query);
        for param in params {
            update = update.bind(param);
        }
        update.bind(id).execute(&mut tx).await?;
        tx.commit().await?;
    }

    get_profile_by_id_in_db(pool, id).await
}

pub async fn set_avatar_url_in_db(
    pool: &SqlitePool,
    id: i64,
    avatar_url: &str,
) -> Result<Profile, RequestError> {
    ensure_profile_in_db(pool, id).await?;
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE profiles SET avatar_url = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2
        "#,
    )
    .bind(avatar_url)
    .bind(id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    get_profile_by_id_in_db(pool, id).await
}
