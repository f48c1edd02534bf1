use serde::{Deserialize, Serialize};

use crate::models::{Post, Profile, Todo, User};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AuthorResponse {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: String,
    pub published: bool,
    pub featured_image: Option<String>,
    pub author_id: i64,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author: AuthorResponse,
}

/// The listing shape: no body, no SEO fields.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PostSummaryResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub category: String,
    pub published: bool,
    pub featured_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub author: AuthorResponse,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct DeletePostResponse {
    pub deleted: bool,
    pub removed_media: Vec<String>,
    pub failed_media: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ProfileResponse {
    pub id: i64,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub youtube_url: Option<String>,
    pub instagram_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub created_at: String,
}

#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
pub struct StatsResponse {
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_todos: i64,
    pub completed_todos: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MediaUploadResponse {
    pub bucket: String,
    pub path: String,
    pub url: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MarkdownResponse {
    pub markdown: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct HtmlResponse {
    pub html: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GeneratedContentResponse {
    pub markdown: String,
    /// `markdown` rendered, ready to insert into a post.
    pub html: String,
    pub model: String,
}

impl From<User> for UserResponse {
    fn from(User { id, email, .. }: User) -> Self {
        UserResponse { id, email }
    }
}

impl PostResponse {
    pub fn new(
        Post {
            id,
            title,
            slug,
            content,
            excerpt,
            category,
            published,
            featured_image,
            author_id,
            seo_title,
            seo_description,
            seo_keywords,
            created_at,
            updated_at,
            author_display_name,
            author_avatar_url,
        }: Post,
    ) -> Self {
        PostResponse {
            id,
            title,
            slug,
            content,
            excerpt,
            category,
            published,
            featured_image,
            author_id,
            seo_title,
            seo_description,
            seo_keywords,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            author: AuthorResponse {
                display_name: author_display_name,
                avatar_url: author_avatar_url,
            },
        }
    }
}

impl PostSummaryResponse {
    pub fn new(
        Post {
            id,
            title,
            slug,
            excerpt,
            category,
            published,
            featured_image,
            created_at,
            updated_at,
            author_display_name,
            author_avatar_url,
            ..
        }: Post,
    ) -> Self {
        PostSummaryResponse {
            id,
            title,
            slug,
            excerpt,
            category,
            published,
            featured_image,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            author: AuthorResponse {
                display_name: author_display_name,
                avatar_url: author_avatar_url,
            },
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(
        Profile {
            id,
            display_name,
            avatar_url,
            youtube_url,
            instagram_url,
            twitter_url,
            facebook_url,
            ..
        }: Profile,
    ) -> Self {
        ProfileResponse {
            id,
            display_name,
            avatar_url,
            youtube_url,
            instagram_url,
            twitter_url,
            facebook_url,
        }
    }
}

impl From<Todo> for TodoResponse {
    fn from(
        Todo {
            id,
            title,
            is_completed,
            created_at,
            ..
        }: Todo,
    ) -> Self {
        TodoResponse {
            id,
            title,
            is_completed,
            created_at: created_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MediaProbeResponse {
    pub bucket: String,
    pub writable: bool,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusResponse {
    pub rss: String,
    pub virtual_memory: String,
    pub data_segment: String,
    pub peak_rss: String,
    pub uptime: String,
}
