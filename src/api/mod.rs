//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod health;
pub mod routes;

pub use dto::{
    ApiJson, CreateTodoRequest, MessageResponse, RootResponse, TodoResponse, UpdateTodoRequest,
};
pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{
    AppState, create_todo, delete_todo, get_todo, list_todos, root, route_not_found, update_todo,
};
pub use health::{
    DetailedHealthResponse, HealthResponse, MemoryUsage, UnhealthyResponse, detailed_health_check,
    health_check,
};
pub use routes::build_router;
