use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use todo_api::config::ServerConfig;
use todo_api::store::{Database, SqliteTodoStore, TodoStore};
use todo_api::todos::todo_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();

    let db = Arc::new(Database::open(&config.db_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }));

    let store: Arc<dyn TodoStore> = Arc::new(SqliteTodoStore::new(db));

    let app = todo_routes(store)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, db = %config.db_path.display(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
