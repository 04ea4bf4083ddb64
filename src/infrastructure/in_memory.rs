//! In-memory repository implementation.
//!
//! Suitable for development and tests. Storage is a `HashMap` behind
//! `Arc<RwLock<...>>`; every operation takes the lock exactly once, which is
//! what makes each call atomic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId, TaskPatch, TaskText, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

const DATABASE_NAME: &str = "in_memory";

/// A task plus its insertion order, used to break `created_at` ties.
#[derive(Debug, Clone)]
struct StoredTask {
    sequence: u64,
    task: Task,
}

#[derive(Debug, Default)]
struct TaskTable {
    rows: HashMap<TaskId, StoredTask>,
    next_sequence: u64,
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = InMemoryTaskRepository::new();
/// let task = repository.create("Learn Jenkins").await?;
/// let found = repository.find_by_id(&task.task_id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    table: Arc<RwLock<TaskTable>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        let guard = self.table.read().await;

        let mut rows: Vec<&StoredTask> = guard.rows.values().collect();
        rows.sort_by(|left, right| {
            right
                .task
                .created_at
                .cmp(&left.task.created_at)
                .then(right.sequence.cmp(&left.sequence))
        });

        Ok(rows.into_iter().map(|row| row.task.clone()).collect())
    }

    async fn create(&self, text: &str) -> Result<Task, RepositoryError> {
        // Validate before taking the write lock; invalid input never reaches storage.
        let text = TaskText::parse(text)?;
        let task = Task::new(TaskId::generate(), text, Timestamp::now());

        let mut guard = self.table.write().await;
        let sequence = guard.next_sequence;
        guard.next_sequence += 1;
        guard.rows.insert(
            task.task_id,
            StoredTask {
                sequence,
                task: task.clone(),
            },
        );

        tracing::debug!(task_id = %task.task_id, "Task created");
        Ok(task)
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Task, RepositoryError> {
        let guard = self.table.read().await;
        guard
            .rows
            .get(id)
            .map(|row| row.task.clone())
            .ok_or_else(|| RepositoryError::not_found(id))
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError> {
        let mut guard = self.table.write().await;

        let row = guard
            .rows
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found(id))?;

        let updated = row.task.clone().apply(patch, Timestamp::now())?;
        row.task = updated.clone();

        tracing::debug!(task_id = %id, completed = updated.completed, "Task updated");
        Ok(updated)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError> {
        let mut guard = self.table.write().await;
        match guard.rows.remove(id) {
            Some(_) => {
                tracing::debug!(task_id = %id, "Task deleted");
                Ok(())
            }
            None => Err(RepositoryError::not_found(id)),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let guard = self.table.read().await;
        Ok(guard.rows.len() as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn database_name(&self) -> &str {
        DATABASE_NAME
    }
}

// =============================================================================
// Tests
// =============================================================================
