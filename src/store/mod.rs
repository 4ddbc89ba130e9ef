//! Persistence layer — SQLite-backed storage for todos.

pub mod db;
pub mod todos;

pub use db::Database;
pub use todos::{SqliteTodoStore, TodoStore};
