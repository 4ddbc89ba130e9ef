//! Error types for the todo API.

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to open database at {path}: {message}")]
    Open { path: String, message: String },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
