//! Configuration types.

use std::path::PathBuf;

/// Server configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl ServerConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparsable.
    ///
    /// - `PORT` — listen port (default 3000)
    /// - `TODO_API_DB_PATH` — database file (default `./data/todos.sqlite`)
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let db_path = std::env::var("TODO_API_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/todos.sqlite"));

        Self { port, db_path }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: PathBuf::from("./data/todos.sqlite"),
        }
    }
}
