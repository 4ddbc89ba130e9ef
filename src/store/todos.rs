//! TodoStore — CRUD operations for persisting todos to SQLite.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

use crate::error::DatabaseError;
use crate::todos::model::{CreateTodo, Todo, UpdateTodo};

use super::db::Database;

/// Persistence operations for todos.
///
/// Absence is a normal return value (`Option`/`bool`), never an error; only
/// store failures surface as `DatabaseError`. Kept as a trait so the HTTP
/// layer can be exercised against test doubles.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, newest-id-first.
    async fn list(&self) -> Result<Vec<Todo>, DatabaseError>;

    /// Look up a todo by id.
    async fn get(&self, id: i64) -> Result<Option<Todo>, DatabaseError>;

    /// Insert a new todo and return the stored record.
    async fn create(&self, new: CreateTodo) -> Result<Todo, DatabaseError>;

    /// Merge the provided fields over an existing todo. `None` if the id
    /// does not exist; nothing is written in that case.
    async fn update(&self, id: i64, changes: UpdateTodo) -> Result<Option<Todo>, DatabaseError>;

    /// Delete a todo. True iff a row was actually removed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Whether the store is reachable.
    async fn health_check(&self) -> bool;
}

/// SQLite-backed todo storage.
pub struct SqliteTodoStore {
    db: Arc<Database>,
}

impl SqliteTodoStore {
    /// Create a new store wrapping the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, DatabaseError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, completed, createdAt, updatedAt FROM todos ORDER BY id DESC",
        )?;

        let todos = stmt
            .query_map([], row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(todos)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.db.conn();
        Ok(get_by_id(&conn, id)?)
    }

    async fn create(&self, new: CreateTodo) -> Result<Todo, DatabaseError> {
        let conn = self.db.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO todos (title, completed, createdAt, updatedAt) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                new.title,
                if new.completed { 1i64 } else { 0i64 },
                now,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(todo_id = id, "Todo inserted");

        // Re-read so the caller observes store-assigned values
        get_by_id(&conn, id)?
            .ok_or(DatabaseError::Query(rusqlite::Error::QueryReturnedNoRows))
    }

    async fn update(&self, id: i64, changes: UpdateTodo) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.db.conn();

        let Some(current) = get_by_id(&conn, id)? else {
            return Ok(None);
        };

        let title = changes.title.unwrap_or(current.title);
        let completed = changes.completed.unwrap_or(current.completed);
        let updated_at = Utc::now().to_rfc3339();

        conn.execute(
            "UPDATE todos SET title = ?1, completed = ?2, updatedAt = ?3 WHERE id = ?4",
            rusqlite::params![title, if completed { 1i64 } else { 0i64 }, updated_at, id],
        )?;
        debug!(todo_id = id, "Todo updated");

        Ok(get_by_id(&conn, id)?)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM todos WHERE id = ?1", rusqlite::params![id])?;
        if removed > 0 {
            debug!(todo_id = id, "Todo deleted");
        }
        Ok(removed > 0)
    }

    async fn health_check(&self) -> bool {
        self.db.health_check()
    }
}

/// Fetch a todo by id using an already-held connection lock.
fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Todo>, rusqlite::Error> {
    let mut stmt = conn
        .prepare("SELECT id, title, completed, createdAt, updatedAt FROM todos WHERE id = ?1")?;

    let mut rows = stmt.query_map(rusqlite::params![id], row_to_todo)?;
    match rows.next() {
        Some(Ok(todo)) => Ok(Some(todo)),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Parse an RFC 3339 timestamp, falling back to epoch on parse failure.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::MIN_UTC)
}

/// Map a SQLite row to a Todo. Storage-level 0/1 becomes a bool here and
/// never leaks past this boundary.
fn row_to_todo(row: &rusqlite::Row<'_>) -> Result<Todo, rusqlite::Error> {
    let completed: i64 = row.get(2)?;
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;

    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        completed: completed != 0,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteTodoStore {
        let db = Arc::new(Database::open_in_memory().unwrap());
        SqliteTodoStore::new(db)
    }

    fn make_create(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            completed: false,
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let store = test_store();
        let created = store.create(make_create("Buy milk")).await.unwrap();

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, "Buy milk");
        assert!(!fetched.completed);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn create_with_completed_set() {
        let store = test_store();
        let created = store
            .create(CreateTodo {
                title: "Done already".to_string(),
                completed: true,
            })
            .await
            .unwrap();
        assert!(created.completed);

        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert!(fetched.completed);
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let store = test_store();
        let a = store.create(make_create("A")).await.unwrap();
        let b = store.create(make_create("B")).await.unwrap();
        let c = store.create(make_create("C")).await.unwrap();

        assert!(a.id > 0);
        assert!(b.id > a.id);
        assert!(c.id > b.id);
    }

    #[tokio::test]
    async fn get_not_found() {
        let store = test_store();
        assert!(store.get(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_empty() {
        let store = test_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_newest_first() {
        let store = test_store();
        store.create(make_create("A")).await.unwrap();
        store.create(make_create("B")).await.unwrap();
        store.create(make_create("C")).await.unwrap();

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn update_partial_preserves_other_fields() {
        let store = test_store();
        let created = store.create(make_create("A")).await.unwrap();

        let updated = store
            .update(
                created.id,
                UpdateTodo {
                    title: None,
                    completed: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "A");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn update_explicit_false_clears_flag() {
        let store = test_store();
        let created = store
            .create(CreateTodo {
                title: "T".to_string(),
                completed: true,
            })
            .await
            .unwrap();

        let updated = store
            .update(
                created.id,
                UpdateTodo {
                    title: None,
                    completed: Some(false),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.completed);
    }

    #[tokio::test]
    async fn update_title_preserves_completed() {
        let store = test_store();
        let created = store
            .create(CreateTodo {
                title: "Old".to_string(),
                completed: true,
            })
            .await
            .unwrap();

        let updated = store
            .update(
                created.id,
                UpdateTodo {
                    title: Some("New".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "New");
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn update_bumps_updated_at() {
        let store = test_store();
        let created = store.create(make_create("A")).await.unwrap();

        // Ensure the clock moves past the creation timestamp
        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = store
            .update(
                created.id,
                UpdateTodo {
                    title: Some("B".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_absent_returns_none() {
        let store = test_store();
        let result = store
            .update(
                42,
                UpdateTodo {
                    title: Some("X".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_then_delete() {
        let store = test_store();
        let created = store.create(make_create("A")).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_absent_returns_false() {
        let store = test_store();
        assert!(!store.delete(7).await.unwrap());
    }

    #[tokio::test]
    async fn health_check_ok() {
        let store = test_store();
        assert!(store.health_check().await);
    }
}
