use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::AuthUser,
    data_formats::{CreateTodoRequest, MultipleTodosWrapper, TodoWrapper},
    db_helpers::{delete_todo_in_db, insert_todo_in_db, list_todos_in_db, toggle_todo_in_db},
    errors::RequestError,
    AppState, JsonResponse,
};

use super::JsonResult;

// ----------------- Todo Handlers -----------------
pub async fn list_todos(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
) -> JsonResult<MultipleTodosWrapper> {
    let todos = list_todos_in_db(&state.pool, auth.id).await?;
    Ok(Json(MultipleTodosWrapper {
        todos: todos.into_iter().map(Into::into).collect(),
    }))
}

pub async fn create_todo(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<CreateTodoRequest>,
) -> Result<JsonResponse<TodoWrapper>, RequestError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(RequestError::Validation(
            "Todo title is required".to_string(),
        ));
    }
    let todo = insert_todo_in_db(&state.pool, auth.id, title).await?;
    Ok((StatusCode::CREATED, Json(TodoWrapper { todo: todo.into() })))
}

pub async fn toggle_todo(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> JsonResult<TodoWrapper> {
    let todo = toggle_todo_in_db(&state.pool, id, auth.id).await?;
    Ok(Json(TodoWrapper { todo: todo.into() }))
}

pub async fn delete_todo(
    Extension(state): Extension<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    delete_todo_in_db(&state.pool, id, auth.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
