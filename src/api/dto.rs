//! Data Transfer Objects for API requests and responses.
//!
//! This module contains DTOs that are separate from domain models,
//! providing a clean API contract. The response types also derive
//! `Deserialize` so the client decodes exactly what the server encodes.

use axum::{
    Json,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::error::ApiErrorResponse;
use crate::domain::{Task, TaskPatch};

// =============================================================================
// JSON Extractor
// =============================================================================

/// `axum::Json` with rejections reported as [`ApiErrorResponse`].
///
/// Used as an extractor so malformed bodies answer `{"code", "message"}`
/// like every other error, and as a response wrapper.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorResponse))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request DTO for creating a todo.
///
/// `text` is optional here so that a missing or `null` field reaches
/// validation and gets the same message as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Request DTO for updating a todo. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TaskPatch {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            text: request.text,
            completed: request.completed,
        }
    }
}

/// Response DTO for a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// RFC 3339 with milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<&Task> for TodoResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.task_id.to_string(),
            text: task.text.to_string(),
            completed: task.completed,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

impl From<Task> for TodoResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

// =============================================================================
// Message DTOs
// =============================================================================

/// A bare `{"message"}` body, returned by delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskText, Timestamp};
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    fn fixed_task() -> Task {
        let timestamp = Timestamp::from_datetime(
            DateTime::parse_from_rfc3339("2024-05-01T12:30:00.125Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        Task::new(
            TaskId::generate(),
            TaskText::parse("Learn Jenkins").unwrap(),
            timestamp,
        )
    }

    #[rstest]
    fn test_todo_response_wire_shape() {
        let task = fixed_task();
        let json = serde_json::to_value(TodoResponse::from(&task)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "_id": task.task_id.to_string(),
                "text": "Learn Jenkins",
                "completed": false,
                "createdAt": "2024-05-01T12:30:00.125Z",
                "updatedAt": "2024-05-01T12:30:00.125Z",
            })
        );
    }

    #[rstest]
    #[case("{}", None)]
    #[case(r#"{"text": null}"#, None)]
    #[case(r#"{"text": "  Learn Jenkins "}"#, Some("  Learn Jenkins "))]
    fn test_create_request_text_is_optional(#[case] body: &str, #[case] expected: Option<&str>) {
        let request: CreateTodoRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.text.as_deref(), expected);
    }

    #[rstest]
    fn test_update_request_into_patch() {
        let request: UpdateTodoRequest = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        let patch = TaskPatch::from(request);
        assert_eq!(patch, TaskPatch::new().with_completed(true));
    }

    #[rstest]
    fn test_update_request_omits_absent_fields() {
        let request = UpdateTodoRequest {
            text: None,
            completed: Some(false),
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            serde_json::json!({"completed": false})
        );
    }
}
