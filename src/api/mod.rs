use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, patch};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Filter, NewTodoRequest, ReorderRequest, Todo, UpdateTodoRequest, filtered_view};
use crate::state::AppState;

#[derive(Deserialize)]
struct TodoQueryParams {
    #[serde(default)]
    filter: Filter,
}

#[derive(Serialize)]
struct IdResponse {
    id: String,
}

#[derive(Serialize)]
struct ClearCompletedResponse {
    deleted_count: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/completed", delete(clear_completed))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/toggle", patch(toggle_todo))
        .route("/todos/{id}/reorder", patch(reorder_todo))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<TodoQueryParams>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state.store.list().await?;
    Ok(Json(filtered_view(todos, params.filter)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let todo = state.store.get(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(todo))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(req): Json<NewTodoRequest>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    let todo = state.store.create(req).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: todo.id })))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<IdResponse>, AppError> {
    let todo = state.store.update(&id, req).await?;
    Ok(Json(IdResponse { id: todo.id }))
}

async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IdResponse>, AppError> {
    let todo = state.store.toggle(&id).await?;
    Ok(Json(IdResponse { id: todo.id }))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IdResponse>, AppError> {
    state.store.delete(&id).await?;
    Ok(Json(IdResponse { id }))
}

async fn reorder_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, AppError> {
    state.store.reorder(&id, req.new_order).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_completed(
    State(state): State<AppState>,
) -> Result<Json<ClearCompletedResponse>, AppError> {
    let deleted_count = state.store.clear_completed().await?;
    Ok(Json(ClearCompletedResponse { deleted_count }))
}
