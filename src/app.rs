use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::errors::ApiError;
use crate::models::{CreateTodo, Message, TodoItem, UpdateStatus};
use crate::service::TodoService;
use crate::store::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            todos: Arc::new(TodoService::new(store)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/todos",
            get(list_todos).post(create_todo).delete(clear_completed),
        )
        .route("/api/todos/:id", put(update_status).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    Ok(Json(state.todos.list().await?))
}

async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoItem>), ApiError> {
    let Json(body) = body.map_err(reject_body)?;
    let todo = state.todos.create(body).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatus>, JsonRejection>,
) -> Result<Json<TodoItem>, ApiError> {
    let Json(body) = body.map_err(reject_body)?;
    let id = parse_id(&id)?;
    Ok(Json(state.todos.set_done(id, body).await?))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.todos.delete(id).await?))
}

async fn clear_completed(State(state): State<AppState>) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.todos.clear_completed().await?))
}

/// An id that is not an integer can never match a stored item.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found(raw))
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError::validation(format!("invalid JSON body: {}", rejection.body_text()))
}
