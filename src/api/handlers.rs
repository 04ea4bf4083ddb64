//! HTTP handlers for the Todo API.
//!
//! Handlers hold no state of their own: everything they need arrives through
//! [`AppState`]. Each one validates its input, makes exactly one store call,
//! and maps the outcome to a response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::dto::{
    ApiJson, CreateTodoRequest, MessageResponse, RootResponse, TodoResponse, UpdateTodoRequest,
};
use super::error::{ApiErrorResponse, ROUTE_NOT_FOUND};
use crate::config::AppConfig;
use crate::domain::{TaskId, TaskPatch, TaskText, TaskValidationError};
use crate::infrastructure::TaskRepository;

/// Message returned by `GET /`.
pub const API_NAME: &str = "Task Board API";
/// Message returned after a successful delete.
pub const TODO_DELETED: &str = "Todo deleted successfully";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses a trait object so the backend (in-memory or `PostgreSQL`) is chosen
/// at runtime by `RepositoryFactory`, and tests can inject their own.
#[derive(Clone)]
pub struct AppState {
    /// Task repository for persistence.
    pub task_repository: Arc<dyn TaskRepository>,
    /// Application configuration.
    pub config: AppConfig,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new `AppState` with the default configuration.
    #[must_use]
    pub fn new(task_repository: Arc<dyn TaskRepository>) -> Self {
        Self::with_config(task_repository, AppConfig::default())
    }

    /// Creates a new `AppState` from a repository and custom configuration.
    #[must_use]
    pub fn with_config(task_repository: Arc<dyn TaskRepository>, config: AppConfig) -> Self {
        Self {
            task_repository,
            config,
            started_at: Instant::now(),
        }
    }
}

/// Parses a path id. Anything that is not a task id cannot name a record, so
/// it is reported as not found.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiErrorResponse> {
    raw.parse::<TaskId>().map_err(|error| {
        tracing::debug!(%error, "Unparseable todo id");
        ApiErrorResponse::todo_not_found()
    })
}

/// Unwraps a create body. A body not declared as JSON carries no text, so it
/// reaches validation like an empty object.
fn create_request(
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<CreateTodoRequest, ApiErrorResponse> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(rejection)) => {
            tracing::debug!(%rejection, "Create body without JSON content type");
            Ok(CreateTodoRequest::default())
        }
        Err(rejection) => Err(rejection.into()),
    }
}

// =============================================================================
// Todo Handlers
// =============================================================================

/// `GET /api/todos`: all todos, newest first.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<ApiJson<Vec<TodoResponse>>, ApiErrorResponse> {
    let tasks = state.task_repository.list().await?;
    Ok(ApiJson(tasks.iter().map(TodoResponse::from).collect()))
}

/// `POST /api/todos`: creates a todo from `{"text"}`.
///
/// # Response
///
/// - **201 Created**: the new record
/// - **400 Bad Request**: text missing, blank, or longer than 200 characters
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for validation failures (400) and store
/// failures (500).
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, ApiJson<TodoResponse>), ApiErrorResponse> {
    // Reject before the store is touched.
    let text = create_request(payload)?
        .text
        .as_deref()
        .ok_or(TaskValidationError::EmptyText)
        .and_then(TaskText::parse)?;

    let task = state.task_repository.create(text.as_str()).await?;
    tracing::info!(task_id = %task.task_id, "Todo created");

    Ok((StatusCode::CREATED, ApiJson(TodoResponse::from(task))))
}

/// `GET /api/todos/{id}`.
///
/// # Errors
///
/// Returns 404 "Todo not found" for unknown or unparseable ids.
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiJson<TodoResponse>, ApiErrorResponse> {
    let task_id = parse_task_id(&id)?;
    let task = state.task_repository.find_by_id(&task_id).await?;
    Ok(ApiJson(TodoResponse::from(task)))
}

/// `PUT /api/todos/{id}`: changes `text` and/or `completed`.
///
/// # Errors
///
/// - 404 "Todo not found" if the id names no record
/// - 400 with the validation message if `text` is invalid; the whole
///   update is rejected in that case
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTodoRequest>,
) -> Result<ApiJson<TodoResponse>, ApiErrorResponse> {
    let task_id = parse_task_id(&id)?;
    let patch = TaskPatch::from(request);

    let task = state.task_repository.update(&task_id, &patch).await?;
    tracing::info!(task_id = %task.task_id, completed = task.completed, "Todo updated");

    Ok(ApiJson(TodoResponse::from(task)))
}

/// `DELETE /api/todos/{id}`.
///
/// # Errors
///
/// Returns 404 "Todo not found" if the id names no record.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiJson<MessageResponse>, ApiErrorResponse> {
    let task_id = parse_task_id(&id)?;
    state.task_repository.delete(&task_id).await?;
    tracing::info!(%task_id, "Todo deleted");

    Ok(ApiJson(MessageResponse::new(TODO_DELETED)))
}

// =============================================================================
// Misc Handlers
// =============================================================================

/// `GET /`: API name and version.
pub async fn root(State(state): State<AppState>) -> ApiJson<RootResponse> {
    ApiJson(RootResponse {
        message: API_NAME.to_string(),
        version: state.config.version,
    })
}

/// Fallback for every unmatched route.
pub async fn route_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found(ROUTE_NOT_FOUND)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryTaskRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState {
        AppState::new(Arc::new(InMemoryTaskRepository::new()))
    }

    fn create_body(text: Option<&str>) -> Result<Json<CreateTodoRequest>, JsonRejection> {
        Ok(Json(CreateTodoRequest {
            text: text.map(str::to_string),
        }))
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    #[tokio::test]
    async fn test_create_todo_requires_text(state: AppState, #[case] text: Option<&str>) {
        let result = create_todo(State(state.clone()), create_body(text)).await;

        let error = result.unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.message, "Todo text is required");
        assert_eq!(state.task_repository.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_trims_text(state: AppState) {
        let (status, ApiJson(response)) =
            create_todo(State(state), create_body(Some("  Learn Jenkins  ")))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.text, "Learn Jenkins");
        assert!(!response.completed);
        assert_eq!(response.created_at, response.updated_at);
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_todo_with_bad_id_is_not_found(state: AppState) {
        let error = get_todo(State(state), Path("bad-id".to_string()))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error.message, "Todo not found");
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_todo_missing(state: AppState) {
        let request = ApiJson(UpdateTodoRequest {
            text: None,
            completed: Some(true),
        });

        let error = update_todo(State(state), Path(TaskId::generate().to_string()), request)
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_todo_message(state: AppState) {
        let task = state.task_repository.create("Learn Jenkins").await.unwrap();

        let ApiJson(response) = delete_todo(State(state.clone()), Path(task.task_id.to_string()))
            .await
            .unwrap();

        assert_eq!(response.message, "Todo deleted successfully");
        assert_eq!(state.task_repository.count().await.unwrap(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_root_reports_version(state: AppState) {
        let ApiJson(response) = root(State(state)).await;
        assert_eq!(response.message, API_NAME);
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
    }
}
