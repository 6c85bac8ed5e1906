//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Extractors are taken as `Result` so malformed input is
//! reported through [`AppError`] with a 422 instead of axum's defaults.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{CreateTodoRequest, HealthResponse, ListTodosQuery, UpdateTodoRequest};
use super::error::AppError;
use super::state::AppState;
use crate::db::services;
use crate::models::{Todo, TodoId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const TODO_NOT_FOUND: &str = "Todo not found";

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Liveness only; does not touch the store.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Todo CRUD
// =============================================================================

/// POST /todos
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(request) = body?;
    let todo = services::create_todo(state.repository.as_ref(), request.into()).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /todos?skip=&limit=
pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> HandlerResult<Vec<Todo>> {
    let Query(query) = query?;
    let todos =
        services::list_todos(state.repository.as_ref(), query.skip(), query.limit()).await?;
    Ok(Json(todos))
}

/// GET /todos/{id}
pub async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> HandlerResult<Todo> {
    let Path(id) = id?;
    services::get_todo(state.repository.as_ref(), TodoId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))
}

/// PUT /todos/{id}
///
/// Partial update: only keys present in the body are applied.
pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> HandlerResult<Todo> {
    let Path(id) = id?;
    let Json(request) = body?;
    services::update_todo(state.repository.as_ref(), TodoId::new(id), request.into())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.to_string()))
}

/// DELETE /todos/{id}
pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    if services::delete_todo(state.repository.as_ref(), TodoId::new(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(TODO_NOT_FOUND.to_string()))
    }
}
