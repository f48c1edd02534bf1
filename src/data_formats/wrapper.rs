use serde::{Deserialize, Serialize};

use super::response::{PostSummaryResponse, ProfileResponse, TodoResponse, UserResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SessionWrapper<T> {
    pub session: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileWrapper {
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper<T> {
    pub post: T,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TodoWrapper {
    pub todo: TodoResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultipleTodosWrapper {
    pub todos: Vec<TodoResponse>,
}

/// One page of posts plus the exact number of matching rows.
#[derive(Debug, Deserialize, Serialize)]
pub struct PostPageWrapper<T> {
    pub posts: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RecentPostsWrapper {
    pub posts: Vec<PostSummaryResponse>,
    pub total: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MultiplePostsWrapper<T> {
    pub posts: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoriesWrapper {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MediaListWrapper<T> {
    pub objects: Vec<T>,
}

impl UserWrapper<UserResponse> {
    pub fn wrap_with_user_data(request: UserResponse) -> UserWrapper<UserResponse> {
        UserWrapper { user: request }
    }
}

impl<T> PostPageWrapper<T> {
    pub fn new(posts: Vec<T>, total: i64, page: u32, per_page: u32) -> Self {
        let per_page_i64 = i64::from(per_page.max(1));
        PostPageWrapper {
            posts,
            total,
            page,
            per_page,
            total_pages: (total + per_page_i64 - 1) / per_page_i64,
        }
    }
}
