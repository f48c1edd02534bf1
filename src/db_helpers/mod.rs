use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

mod post_helpers;
mod profile_helpers;
mod todo_helpers;
mod user_helpers;

pub use post_helpers::*;
pub use profile_helpers::*;
pub use todo_helpers::*;
pub use user_helpers::*;

/// Builds the `SET` list of a partial update. Blank values are bound as NULL.
struct QueryBuilder {
    query: String,
    params: Vec<Option<String>>,
    seperator: Option<&'static str>,
    counter: usize,
}

impl QueryBuilder {
    fn new(initial: String, seperator: Option<&'static str>) -> Self {
        Self {
            query: initial,
            params: vec![],
            seperator,
            counter: 0,
        }
    }

    fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            let filter = format!("{} = ${}", column, self.params.len() + 1);
            self.query.push_str(&filter);
            if let Some(seperator) = self.seperator {
                self.query.push_str(seperator);
            }
            let value = value.trim().to_string();
            self.params.push((!value.is_empty()).then_some(value));
            self.counter += 1;
        }
        self
    }

    fn trim(mut self) -> Self {
        if let Some(seperator) = self.seperator {
            self.query = self.query.trim_end_matches(seperator).to_string();
        }
        self
    }

    /// `None` when no column was set.
    pub fn build(mut self) -> Option<(String, Vec<Option<String>>)> {
        self = self.trim();
        if self.counter == 0 {
            return None;
        }
        Some((self.query, self.params))
    }
}

// ----------------- Helper Functions -----------------

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, created_at FROM users WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let result = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, password, created_at FROM users WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}
