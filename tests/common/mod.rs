//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, so helpers used by only one
//! file would otherwise warn in the others.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use taskboard::api::{AppState, build_router};
use taskboard::domain::{Task, TaskId, TaskPatch};
use taskboard::infrastructure::{InMemoryTaskRepository, RepositoryError, TaskRepository};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` over a fresh in-memory store.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTaskRepository::new()))
}

/// Creates an `AppState` whose store fails every call with a database error.
pub fn create_failing_app_state() -> AppState {
    AppState::new(Arc::new(FailingTaskRepository))
}

pub fn create_test_app(state: AppState) -> Router {
    build_router(state)
}

// =============================================================================
// Failing Repository
// =============================================================================

/// Store double that behaves like an unreachable database.
pub struct FailingTaskRepository;

fn unavailable() -> RepositoryError {
    RepositoryError::DatabaseError("connection refused".to_string())
}

#[async_trait]
impl TaskRepository for FailingTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        Err(unavailable())
    }

    async fn create(&self, _text: &str) -> Result<Task, RepositoryError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: &TaskId) -> Result<Task, RepositoryError> {
        Err(unavailable())
    }

    async fn update(&self, _id: &TaskId, _patch: &TaskPatch) -> Result<Task, RepositoryError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &TaskId) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn database_name(&self) -> &str {
        "unreachable"
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends one request through the router and returns status and JSON body.
///
/// A body is sent as `application/json`. An empty response body decodes as
/// `Value::Null`.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let content_type = body.map(|_| "application/json");
    send_with_content_type(app, method, uri, content_type, body).await
}

/// Like [`send`], with an explicit (or absent) `content-type` header.
pub async fn send_with_content_type(
    app: Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let request = request
        .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Creates a todo directly in the store behind `state`.
pub async fn create_and_save_task(state: &AppState, text: &str) -> Task {
    state.task_repository.create(text).await.unwrap()
}
