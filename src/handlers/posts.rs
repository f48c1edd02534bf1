use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};

use crate::{
    authentication::AuthUser,
    data_formats::{
        CategoriesWrapper, DeletePostResponse, MultiplePostsWrapper, PostPageWrapper,
        PostQueryParams, PostRequest, PostResponse, PostSummaryResponse, PostWrapper,
        RecentPostsWrapper, RecentQueryParams, StatsResponse, MAX_PER_PAGE,
    },
    db_helpers::{
        delete_post_in_db, get_own_post_in_db, get_published_categories_in_db,
        get_published_post_by_slug_in_db, get_stats_in_db, insert_post_in_db,
        list_posts_by_author_in_db, list_published_posts_in_db, update_post_in_db,
    },
    errors::RequestError,
    models::Post,
    storage::{extract_media_paths_from_content, extract_path_from_url, MEDIA_BUCKET},
    AppState, JsonResponse,
};

use super::{ApiQuery, JsonResult};

type PostJson = PostWrapper<PostResponse>;

fn slug_taken(e: RequestError) -> RequestError {
    if e.is_unique_violation() {
        RequestError::Validation("A post with this slug already exists".to_string())
    } else {
        e
    }
}

/// Storage keys in the `media` bucket a post refers to, without duplicates.
fn media_paths_for(post: &Post) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    let featured = post
        .featured_image
        .as_deref()
        .and_then(extract_path_from_url);
    for path in featured
        .into_iter()
        .chain(extract_media_paths_from_content(&post.content))
    {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths
}

// ----------------- Public Post Handlers -----------------
pub async fn list_posts(
    Extension(state): Extension<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PostQueryParams>,
) -> JsonResult<PostPageWrapper<PostSummaryResponse>> {
    let (from, _) = params.range();
    let (posts, total) = list_published_posts_in_db(
        &state.pool,
        params.category_filter(),
        i64::from(params.per_page()),
        from,
    )
    .await?;
    let posts = posts.into_iter().map(PostSummaryResponse::new).collect();
    Ok(Json(PostPageWrapper::new(
        posts,
        total,
        params.page(),
        params.per_page(),
    )))
}

pub async fn recent_posts(
    Extension(state): Extension<Arc<AppState>>,
    ApiQuery(params): ApiQuery<RecentQueryParams>,
) -> JsonResult<RecentPostsWrapper> {
    let limit = params.limit.clamp(1, MAX_PER_PAGE);
    let (posts, total) =
        list_published_posts_in_db(&state.pool, None, i64::from(limit), 0).await?;
    Ok(Json(RecentPostsWrapper {
        posts: posts.into_iter().map(PostSummaryResponse::new).collect(),
        total,
    }))
}

pub async fn list_categories(
    Extension(state): Extension<Arc<AppState>>,
) -> JsonResult<CategoriesWrapper> {
    let categories = get_published_categories_in_db(&state.pool).await?;
    Ok(Json(CategoriesWrapper { categories }))
}

pub async fn get_post_by_slug(
    Extension(state): Extension<Arc<AppState>>,
    Path(slug): Path<String>,
) -> JsonResult<PostJson> {
    let post = get_published_post_by_slug_in_db(&state.pool, &slug).await?;
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

// ----------------- Admin Post Handlers -----------------
pub async fn get_stats(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> JsonResult<StatsResponse> {
    Ok(Json(get_stats_in_db(&state.pool, auth.id).await?))
}

pub async fn list_own_posts(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> JsonResult<MultiplePostsWrapper<PostResponse>> {
    let posts = list_posts_by_author_in_db(&state.pool, auth.id).await?;
    Ok(Json(MultiplePostsWrapper {
        posts: posts.into_iter().map(PostResponse::new).collect(),
    }))
}

pub async fn get_own_post(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<PostJson> {
    let post = get_own_post_in_db(&state.pool, id, auth.id).await?;
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<PostRequest>,
) -> Result<JsonResponse<PostJson>, RequestError> {
    let new_post = request.validate()?;
    let post = insert_post_in_db(&state.pool, auth.id, new_post)
        .await
        .map_err(slug_taken)?;
    tracing::info!("User {} created post {} ({})", auth.id, post.id, post.slug);
    Ok((
        StatusCode::CREATED,
        Json(PostWrapper {
            post: PostResponse::new(post),
        }),
    ))
}

pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<PostRequest>,
) -> JsonResult<PostJson> {
    let new_post = request.validate()?;
    let post = update_post_in_db(&state.pool, id, auth.id, new_post)
        .await
        .map_err(slug_taken)?;
    tracing::info!("User {} updated post {}", auth.id, post.id);
    Ok(Json(PostWrapper {
        post: PostResponse::new(post),
    }))
}

/// Delete a post and, best effort, every image it referenced.
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<DeletePostResponse> {
    let post = get_own_post_in_db(&state.pool, id, auth.id).await?;

    let mut removed_media = Vec::new();
    let mut failed_media = Vec::new();
    for path in media_paths_for(&post) {
        match state.storage.remove(MEDIA_BUCKET, &path).await {
            Ok(()) => {
                tracing::debug!("Removed media {} of post {}", path, post.id);
                removed_media.push(path);
            }
            Err(e) => {
                tracing::warn!("Could not remove media {} of post {}: {}", path, post.id, e);
                failed_media.push(path);
            }
        }
    }

    delete_post_in_db(&state.pool, post.id, auth.id).await?;
    tracing::info!("User {} deleted post {}", auth.id, post.id);

    Ok(Json(DeletePostResponse {
        deleted: true,
        removed_media,
        failed_media,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn post(featured_image: Option<&str>, content: &str) -> Post {
        let now = NaiveDateTime::default();
        Post {
            id: 1,
            title: "Title".to_string(),
            slug: "title".to_string(),
            content: content.to_string(),
            excerpt: None,
            category: "tech".to_string(),
            published: true,
            featured_image: featured_image.map(str::to_string),
            author_id: 1,
            seo_title: None,
            seo_description: None,
            seo_keywords: None,
            created_at: now,
            updated_at: now,
            author_display_name: "Anonymous".to_string(),
            author_avatar_url: None,
        }
    }

    #[test]
    fn collects_featured_and_content_media_once() {
        let base = "http://localhost:3000/storage/v1/object/public/media";
        let content = format!(
            r#"<p><img src="{base}/content/a.png"></p><p><img src="{base}/content/b.png"> <img src="{base}/content/a.png"></p>"#
        );
        let featured = format!("{base}/featured/cover.jpg?v=2");
        let paths = media_paths_for(&post(Some(&featured), &content));
        assert_eq!(
            paths,
            vec!["featured/cover.jpg", "content/a.png", "content/b.png"]
        );
    }

    #[test]
    fn post_without_media_has_no_paths() {
        assert!(media_paths_for(&post(None, "# Just text")).is_empty());
    }
}
