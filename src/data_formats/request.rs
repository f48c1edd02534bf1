use serde::{Deserialize, Serialize};

use crate::{
    errors::RequestError,
    utils::{non_blank, slugify},
};

pub const DEFAULT_CATEGORY: &str = "tech";

// ----------------- Auth Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateEmailRequest {
    pub email: String,
}

// ----------------- Post Request -----------------
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub published: Option<bool>,
    pub featured_image: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
}

/// A post as it is written to the database, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: String,
    pub published: bool,
    pub featured_image: Option<String>,
    pub seo_title: String,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
}

impl PostRequest {
    pub fn validate(self) -> Result<NewPost, RequestError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(RequestError::Validation("Post title is required".to_string()));
        }

        let slug = match non_blank(self.slug) {
            Some(slug) => slugify(&slug),
            None => slugify(&title),
        };
        if slug.is_empty() {
            return Err(RequestError::Validation("Post slug is required".to_string()));
        }

        let featured_image = match non_blank(self.featured_image) {
            Some(image) if image.starts_with("data:") => {
                tracing::warn!("Dropping inline featured image for post {}", slug);
                None
            }
            image => image,
        };

        let category = non_blank(self.category)
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Ok(NewPost {
            seo_title: non_blank(self.seo_title).unwrap_or_else(|| title.clone()),
            title,
            slug,
            content: self.content.unwrap_or_default(),
            excerpt: non_blank(self.excerpt),
            category,
            published: self.published.unwrap_or(false),
            featured_image,
            seo_description: non_blank(self.seo_description),
            seo_keywords: non_blank(self.seo_keywords),
        })
    }
}

// ----------------- Profile Request -----------------
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub youtube_url: Option<String>,
    pub instagram_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
}

// ----------------- Todo Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateTodoRequest {
    pub title: String,
}

// ----------------- Editor Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct HtmlToMarkdownRequest {
    #[serde(default)]
    pub html: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MarkdownToHtmlRequest {
    #[serde(default)]
    pub markdown: String,
}
