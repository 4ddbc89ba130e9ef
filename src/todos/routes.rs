//! REST endpoints for todos — routing, validation, and status-code mapping.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tracing::{error, info};

use crate::store::TodoStore;
use crate::todos::model::{CreateTodo, UpdateTodo};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

/// Build the Axum router with the todo REST routes and health probe.
pub fn todo_routes(store: Arc<dyn TodoStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn healthz(State(state): State<AppState>) -> Response {
    if state.store.health_check().await {
        (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))).into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"status": "unhealthy"})),
        )
            .into_response()
    }
}

// ── Todos ───────────────────────────────────────────────────────────────

async fn list_todos(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(todos) => (StatusCode::OK, Json(serde_json::json!(todos))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list todos");
            internal_error()
        }
    }
}

async fn get_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid id"})),
            )
                .into_response();
        }
    };

    match state.store.get(id).await {
        Ok(Some(todo)) => (StatusCode::OK, Json(serde_json::json!(todo))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Not found"})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, todo_id = id, "Failed to fetch todo");
            internal_error()
        }
    }
}

async fn create_todo(State(state): State<AppState>, body: String) -> Response {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": message})),
            )
                .into_response();
        }
    };

    let new = match CreateTodo::from_value(&body) {
        Ok(new) => new,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": message})),
            )
                .into_response();
        }
    };

    match state.store.create(new).await {
        Ok(todo) => {
            info!(todo_id = todo.id, "Todo created");
            (StatusCode::CREATED, Json(serde_json::json!(todo))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create todo");
            internal_error()
        }
    }
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: String,
) -> Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid id"})),
            )
                .into_response();
        }
    };

    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": message})),
            )
                .into_response();
        }
    };

    let changes = match UpdateTodo::from_value(&body) {
        Ok(changes) => changes,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": message})),
            )
                .into_response();
        }
    };

    match state.store.update(id, changes).await {
        Ok(Some(todo)) => {
            info!(todo_id = id, "Todo updated");
            (StatusCode::OK, Json(serde_json::json!(todo))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Not found"})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, todo_id = id, "Failed to update todo");
            internal_error()
        }
    }
}

async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id: i64 = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid id"})),
            )
                .into_response();
        }
    };

    match state.store.delete(id).await {
        Ok(true) => {
            info!(todo_id = id, "Todo deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Not found"})),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, todo_id = id, "Failed to delete todo");
            internal_error()
        }
    }
}

/// Parse a request body as JSON. An empty body behaves like an empty object,
/// so field validation produces the 400 rather than the parser.
fn parse_body(raw: &str) -> Result<Value, &'static str> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw).map_err(|_| "Invalid JSON body")
}

// ── Fallback ────────────────────────────────────────────────────────────

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found"})),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Internal server error"})),
    )
        .into_response()
}
