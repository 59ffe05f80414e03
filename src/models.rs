use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: i64,
    pub content: String,
    pub done: bool,
    pub create_time: String,
}

/// The persisted document: `{ "todos": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCollection {
    pub todos: Vec<TodoItem>,
}

impl TodoCollection {
    pub fn find_mut(&mut self, id: i64) -> Option<&mut TodoItem> {
        self.todos.iter_mut().find(|todo| todo.id == id)
    }

    /// Next identifier: the current millisecond clock, bumped past every id
    /// already in the collection. `None` once the id space is used up.
    pub fn next_id(&self, now_millis: i64) -> Option<i64> {
        let highest = self.todos.iter().map(|todo| todo.id).max();
        match highest {
            Some(highest) if highest >= now_millis => highest.checked_add(1),
            _ => Some(now_millis),
        }
    }
}

/// Body of `POST /api/todos`. Fields stay loosely typed so that wrong types
/// surface as validation errors rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub create_time: Option<serde_json::Value>,
}

/// Body of `PUT /api/todos/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatus {
    #[serde(default)]
    pub done: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Current time the way browsers print `Date.toISOString()`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> TodoItem {
        TodoItem {
            id,
            content: format!("todo {id}"),
            done: false,
            create_time: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(item(7)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "content": "todo 7",
                "done": false,
                "createTime": "2026-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn next_id_uses_clock_when_ahead() {
        let collection = TodoCollection {
            todos: vec![item(10), item(20)],
        };
        assert_eq!(collection.next_id(1_000), Some(1_000));
        assert_eq!(TodoCollection::default().next_id(5), Some(5));
    }

    #[test]
    fn next_id_bumps_past_existing() {
        let collection = TodoCollection {
            todos: vec![item(1_000), item(999)],
        };
        assert_eq!(collection.next_id(1_000), Some(1_001));
        assert_eq!(collection.next_id(900), Some(1_001));
    }

    #[test]
    fn next_id_stops_at_max() {
        let collection = TodoCollection {
            todos: vec![item(i64::MAX)],
        };
        assert_eq!(collection.next_id(1_000), None);
    }

    #[test]
    fn now_iso_is_rfc3339_utc() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
