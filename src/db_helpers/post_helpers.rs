use sqlx::SqlitePool;

use crate::{
    data_formats::{NewPost, StatsResponse},
    errors::RequestError,
    models::Post,
};

const POST_SELECT: &str = r#"
        SELECT
            posts.id, posts.title, posts.slug, posts.content, posts.excerpt,
            posts.category, posts.published, posts.featured_image, posts.author_id,
            posts.seo_title, posts.seo_description, posts.seo_keywords,
            posts.created_at, posts.updated_at,
            COALESCE(NULLIF(TRIM(profiles.display_name), ''), 'Anonymous') AS author_display_name,
            profiles.avatar_url AS author_avatar_url
        FROM posts
        LEFT JOIN profiles ON profiles.id = posts.author_id
"#;

const NEWEST_FIRST: &str = "ORDER BY posts.created_at DESC, posts.id DESC";

// ----------------- Public Queries -----------------

/// One page of published posts and the exact count of all matching rows.
pub async fn list_published_posts_in_db(
    pool: &SqlitePool,
    category: Option<String>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Post>, i64), RequestError> {
    let query = format!(
        "{POST_SELECT} WHERE posts.published = TRUE AND ($1 IS NULL OR posts.category = $1) {NEWEST_FIRST} LIMIT $2 OFFSET $3"
    );
    let posts = sqlx::query_as::<_, Post>(&query)
        .bind(&category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM posts
        WHERE published = TRUE AND ($1 IS NULL OR category = $1)
        "#,
    )
    .bind(&category)
    .fetch_one(pool)
    .await?;

    Ok((posts, total))
}

pub async fn get_published_categories_in_db(
    pool: &SqlitePool,
) -> Result<Vec<String>, RequestError> {
    let categories: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT category FROM posts WHERE published = TRUE ORDER BY category
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn get_published_post_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Post, RequestError> {
    let query = format!("{POST_SELECT} WHERE posts.slug = $1 AND posts.published = TRUE");
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    post.ok_or(RequestError::NotFound("Post not found"))
}

// ----------------- Author Queries -----------------

pub async fn list_posts_by_author_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let query = format!("{POST_SELECT} WHERE posts.author_id = $1 {NEWEST_FIRST}");
    let posts = sqlx::query_as::<_, Post>(&query)
        .bind(author_id)
        .fetch_all(pool)
        .await?;
    Ok(posts)
}

/// The post with `id`, provided `author_id` wrote it.
pub async fn get_own_post_in_db(
    pool: &SqlitePool,
    id: i64,
    author_id: i64,
) -> Result<Post, RequestError> {
    let query = format!("{POST_SELECT} WHERE posts.id = $1");
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match post {
        Some(post) if post.author_id == author_id => Ok(post),
        Some(_) => Err(RequestError::Forbidden),
        None => Err(RequestError::NotFound("Post not found")),
    }
}

pub async fn insert_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    post: NewPost,
) -> Result<Post, RequestError> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO posts (
            title, slug, content, excerpt, category, published, featured_image,
            author_id, seo_title, seo_description, seo_keywords
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(post.title)
    .bind(post.slug)
    .bind(post.content)
    .bind(post.excerpt)
    .bind(post.category)
    .bind(post.published)
    .bind(post.featured_image)
    .bind(author_id)
    .bind(post.seo_title)
    .bind(post.seo_description)
    .bind(post.seo_keywords)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;

    get_own_post_in_db(pool, id, author_id).await
}

pub async fn update_post_in_db(
    pool: &SqlitePool,
    id: i64,
    author_id: i64,
    post: NewPost,
) -> Result<Post, RequestError> {
    get_own_post_in_db(pool, id, author_id).await?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE posts SET
            title = $1, slug = $2, content = $3, excerpt = $4, category = $5,
            published = $6, featured_image = $7, seo_title = $8,
            seo_description = $9, seo_keywords = $10,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $11 AND author_id = $12
        "#,
    )
    .bind(post.title)
    .bind(post.slug)
    .bind(post.content)
    .bind(post.excerpt)
    .bind(post.category)
    .bind(post.published)
    .bind(post.featured_image)
    .bind(post.seo_title)
    .bind(post.seo_description)
    .bind(post.seo_keywords)
    .bind(id)
    .bind(author_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    get_own_post_in_db(pool, id, author_id).await
}

pub async fn delete_post_in_db(
    pool: &SqlitePool,
    id: i64,
    author_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        DELETE FROM posts WHERE id = $1 AND author_id = $2
        "#,
    )
    .bind(id)
    .bind(author_id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;
    Ok(())
}

// ----------------- Dashboard -----------------

pub async fn get_stats_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<StatsResponse, RequestError> {
    let (total_posts, published_posts): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(CASE WHEN published THEN 1 ELSE 0 END), 0)
        FROM posts WHERE author_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let (total_todos, completed_todos): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0)
        FROM todos WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(StatsResponse {
        total_posts,
        published_posts,
        draft_posts: total_posts - published_posts,
        total_todos,
        completed_todos,
    })
}
