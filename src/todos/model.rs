//! Todo data model — the persisted entity and validated request records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single to-do item, as stored and as serialized on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Store-assigned unique ID. Never reused.
    pub id: i64,
    /// Task title. Never empty or whitespace-only.
    pub title: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Rewritten on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    pub completed: bool,
}

/// A validated partial-update request. `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl CreateTodo {
    /// Validate an untyped request body into a create record.
    ///
    /// `title` must be a string that is non-empty after trimming; the trimmed
    /// value is kept. `completed` is coerced to a boolean (absent → false).
    pub fn from_value(body: &Value) -> Result<Self, &'static str> {
        let title = match body.get("title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err("Title is required"),
        };

        let completed = body.get("completed").is_some_and(truthy);

        Ok(Self { title, completed })
    }
}

impl UpdateTodo {
    /// Validate an untyped request body into a partial-update record.
    ///
    /// Fields are only applied when present: an explicit `"completed": false`
    /// clears the flag, while an absent key leaves it alone. `title`, when
    /// present, must be a string that is non-empty after trimming;
    /// `completed`, when present, must be a boolean.
    pub fn from_value(body: &Value) -> Result<Self, &'static str> {
        let title = match body.get("title") {
            None => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(_) => return Err("Invalid title"),
        };

        let completed = match body.get("completed") {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => return Err("Invalid completed flag"),
        };

        Ok(Self { title, completed })
    }
}

/// JSON truthiness: null, false, 0, and "" are false; everything else true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
