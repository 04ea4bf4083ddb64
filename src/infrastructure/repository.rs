//! Repository trait for Task Records.
//!
//! This module defines the store contract shared by every backend. Handlers
//! only ever see `Arc<dyn TaskRepository>`, so the backend is chosen at
//! startup and tests can substitute their own implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Task, TaskId, TaskPatch, TaskValidationError};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No live record has the given id.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Input failed domain validation; nothing was persisted.
    #[error("Validation error: {0}")]
    Validation(#[from] TaskValidationError),

    /// Backend unreachable or the query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RepositoryError {
    /// Creates a `NotFound` error for a task id.
    #[must_use]
    pub fn not_found(id: &TaskId) -> Self {
        Self::NotFound(id.to_string())
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Durable collection of Task Records keyed by id.
///
/// Every method is atomic on its own; there are no cross-record
/// transactions.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists all tasks, newest first.
    ///
    /// Tasks created in the same millisecond are ordered by creation order,
    /// later first.
    async fn list(&self) -> Result<Vec<Task>, RepositoryError>;

    /// Validates `text` and persists a new, not completed task.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if `text` is blank or too long.
    async fn create(&self, text: &str) -> Result<Task, RepositoryError>;

    /// Finds a task by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no task has this id.
    async fn find_by_id(&self, id: &TaskId) -> Result<Task, RepositoryError>;

    /// Applies a patch to an existing task and returns the updated task.
    ///
    /// Existence is checked before validation, so an unknown id reports
    /// `NotFound` even if the patch is also invalid.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` if no task has this id
    /// - `RepositoryError::Validation` if the patch text is invalid
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError>;

    /// Deletes a task by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no task has this id.
    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError>;

    /// Counts all tasks.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Name of the backing database, reported by health checks.
    fn database_name(&self) -> &str;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::NotFound("task-123".to_string());
        assert_eq!(format!("{error}"), "Entity not found: task-123");

        let error = RepositoryError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "Database error: connection refused");

        let error = RepositoryError::from(TaskValidationError::EmptyText);
        assert_eq!(format!("{error}"), "Validation error: Todo text is required");
    }

    #[rstest]
    fn test_repository_error_not_found_uses_task_id() {
        let id = TaskId::generate();
        assert_eq!(
            RepositoryError::not_found(&id),
            RepositoryError::NotFound(id.to_string())
        );
    }
}
