//! `PostgreSQL` repository implementation.
//!
//! Task Records are stored as JSONB documents, one row per task, with the
//! timestamps mirrored into typed columns for ordering.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS todos (
//!     id UUID PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC, id DESC);
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::domain::{Task, TaskId, TaskPatch, TaskText, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS todos (\
     id UUID PRIMARY KEY, \
     data JSONB NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL, \
     updated_at TIMESTAMPTZ NOT NULL)";

const CREATE_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at DESC, id DESC)";

const MAX_CONNECTIONS: u32 = 10;

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn encode_task(task: &Task) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(task).map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

fn decode_task(data: serde_json::Value) -> Result<Task, RepositoryError> {
    serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// The pool is created once and shared by every request handler.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
    database_name: String,
}

impl PostgresTaskRepository {
    /// Connects to `database_url`, creates the schema if missing and returns
    /// the repository.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the connection or the schema
    /// statements fail.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(database_error)?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool, creating the schema if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the schema statements fail.
    pub async fn from_pool(pool: PgPool) -> Result<Self, RepositoryError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&pool)
            .await
            .map_err(database_error)?;
        sqlx::query(CREATE_INDEX_SQL)
            .execute(&pool)
            .await
            .map_err(database_error)?;

        let (database_name,): (String,) = sqlx::query_as("SELECT current_database()")
            .fetch_one(&pool)
            .await
            .map_err(database_error)?;

        tracing::info!(database = %database_name, "PostgreSQL schema ready");

        Ok(Self {
            pool,
            database_name,
        })
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, RepositoryError> {
        let rows: Vec<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM todos ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(database_error)?;

        rows.into_iter().map(|(data,)| decode_task(data)).collect()
    }

    async fn create(&self, text: &str) -> Result<Task, RepositoryError> {
        let text = TaskText::parse(text)?;
        let task = Task::new(TaskId::generate(), text, Timestamp::now());
        let data = encode_task(&task)?;

        sqlx::query("INSERT INTO todos (id, data, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(task.task_id.as_uuid())
            .bind(&data)
            .bind(task.created_at.as_datetime())
            .bind(task.updated_at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        tracing::debug!(task_id = %task.task_id, "Task created");
        Ok(task)
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Task, RepositoryError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM todos WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error)?;

        match row {
            Some((data,)) => decode_task(data),
            None => Err(RepositoryError::not_found(id)),
        }
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, RepositoryError> {
        let mut transaction = self.pool.begin().await.map_err(database_error)?;

        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT data FROM todos WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *transaction)
                .await
                .map_err(database_error)?;

        let Some((data,)) = row else {
            return Err(RepositoryError::not_found(id));
        };

        // Dropping the transaction on an error path rolls it back.
        let updated = decode_task(data)?.apply(patch, Timestamp::now())?;
        let data = encode_task(&updated)?;

        sqlx::query("UPDATE todos SET data = $1, updated_at = $2 WHERE id = $3")
            .bind(&data)
            .bind(updated.updated_at.as_datetime())
            .bind(id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(database_error)?;

        transaction.commit().await.map_err(database_error)?;

        tracing::debug!(task_id = %id, completed = updated.completed, "Task updated");
        Ok(updated)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(id));
        }

        tracing::debug!(task_id = %id, "Task deleted");
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        #[allow(clippy::cast_sign_loss)]
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(database_error)
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}

// =============================================================================
// Tests
// =============================================================================
