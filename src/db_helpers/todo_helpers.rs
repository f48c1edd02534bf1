use sqlx::SqlitePool;

use crate::{errors::RequestError, models::Todo};

pub async fn list_todos_in_db(pool: &SqlitePool, user_id: i64) -> Result<Vec<Todo>, RequestError> {
    let todos = sqlx::query_as::<_, Todo>(
        r#"
        SELECT id, user_id, title, is_completed, created_at FROM todos
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(todos)
}

pub async fn insert_todo_in_db(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
) -> Result<Todo, RequestError> {
    let mut tx = pool.begin().await?;
    let todo = sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (user_id, title)
        VALUES ($1, $2)
        RETURNING id, user_id, title, is_completed, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(todo)
}

pub async fn toggle_todo_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Todo, RequestError> {
    let mut tx = pool.begin().await?;
    let todo = sqlx::query_as::<_, Todo>(
        r#"
        UPDATE todos SET is_completed = NOT is_completed
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, is_completed, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;
    todo.ok_or(RequestError::NotFound("Todo not found"))
}

pub async fn delete_todo_in_db(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        DELETE FROM todos WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Todo not found"));
    }
    tx.commit().await?;
    Ok(())
}
