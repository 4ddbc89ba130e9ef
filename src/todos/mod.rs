//! Todo domain — data model and HTTP routes.

pub mod model;
pub mod routes;

pub use model::{CreateTodo, Todo, UpdateTodo};
pub use routes::todo_routes;
