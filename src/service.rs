use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::{ApiError, StoreError};
use crate::models::{now_iso, CreateTodo, Message, TodoItem, UpdateStatus};
use crate::store::TodoStore;

/// The five todo operations. Every call is one load-mutate-save transaction
/// against the store, serialized by `write_lock`.
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    write_lock: Mutex<()>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<TodoItem>, ApiError> {
        let _guard = self.write_lock.lock().await;
        let collection = self
            .store
            .load()
            .await
            .map_err(ApiError::storage("read todos"))?;
        Ok(collection.todos)
    }

    pub async fn create(&self, input: CreateTodo) -> Result<TodoItem, ApiError> {
        let content = parse_content(input.content.as_ref())?;
        let create_time = parse_create_time(input.create_time.as_ref())?;

        let _guard = self.write_lock.lock().await;
        let mut collection = self
            .store
            .load()
            .await
            .map_err(ApiError::storage("add todo"))?;

        let id = collection
            .next_id(Utc::now().timestamp_millis())
            .ok_or(StoreError::IdsExhausted(i64::MAX))
            .map_err(ApiError::storage("add todo"))?;
        let todo = TodoItem {
            id,
            content,
            done: false,
            create_time: create_time.unwrap_or_else(now_iso),
        };
        collection.todos.push(todo.clone());

        self.store
            .save(&collection)
            .await
            .map_err(ApiError::storage("add todo"))?;
        info!(id = todo.id, "todo created");
        Ok(todo)
    }

    pub async fn set_done(&self, id: i64, input: UpdateStatus) -> Result<TodoItem, ApiError> {
        let done = match input.done {
            Some(Value::Bool(done)) => done,
            _ => return Err(ApiError::validation("done must be a boolean")),
        };

        let _guard = self.write_lock.lock().await;
        let mut collection = self
            .store
            .load()
            .await
            .map_err(ApiError::storage("update todo"))?;

        let todo = collection.find_mut(id).ok_or_else(|| ApiError::not_found(id))?;
        todo.done = done;
        let todo = todo.clone();

        self.store
            .save(&collection)
            .await
            .map_err(ApiError::storage("update todo"))?;
        info!(id, done, "todo status updated");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<Message, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self
            .store
            .load()
            .await
            .map_err(ApiError::storage("delete todo"))?;

        let before = collection.todos.len();
        collection.todos.retain(|todo| todo.id != id);
        if collection.todos.len() == before {
            return Err(ApiError::not_found(id));
        }

        self.store
            .save(&collection)
            .await
            .map_err(ApiError::storage("delete todo"))?;
        info!(id, "todo deleted");
        Ok(Message::new("todo deleted"))
    }

    pub async fn clear_completed(&self) -> Result<Message, ApiError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self
            .store
            .load()
            .await
            .map_err(ApiError::storage("clear completed todos"))?;

        let before = collection.todos.len();
        collection.todos.retain(|todo| !todo.done);
        let removed = before - collection.todos.len();

        self.store
            .save(&collection)
            .await
            .map_err(ApiError::storage("clear completed todos"))?;
        info!(removed, "completed todos cleared");
        Ok(Message::new("completed todos cleared"))
    }
}

fn parse_content(value: Option<&Value>) -> Result<String, ApiError> {
    let content = match value {
        Some(Value::String(content)) => content.trim(),
        _ => "",
    };
    if content.is_empty() {
        return Err(ApiError::validation("content must not be empty"));
    }
    Ok(content.to_string())
}

/// A supplied createTime is kept verbatim, but only if it is RFC 3339.
/// Blank strings count as omitted.
fn parse_create_time(value: Option<&Value>) -> Result<Option<String>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) if DateTime::parse_from_rfc3339(raw).is_ok() => {
            Ok(Some(raw.clone()))
        }
        Some(_) => Err(ApiError::validation(
            "createTime must be an ISO-8601 timestamp",
        )),
    }
}
