//! Repository factory for runtime backend selection.
//!
//! Chooses between the in-memory and `PostgreSQL` stores from environment
//! configuration and optionally seeds sample tasks.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `SEED_SAMPLE_TASKS`: `true` | `1` | `yes` to insert sample tasks into an empty store
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use super::{InMemoryTaskRepository, PostgresTaskRepository, RepositoryError, TaskRepository};
use crate::domain::TaskPatch;

/// Sample tasks inserted by [`RepositoryFactory::seed_sample_tasks`], with
/// their completion flag.
pub const SAMPLE_TASKS: [(&str, bool); 4] = [
    ("Learn Jenkins Pipeline basics", false),
    ("Set up automated testing in Jenkins", false),
    ("Configure Docker deployment", true),
    ("Implement CI/CD best practices", false),
];

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage mode for persistent data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// In-memory storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// `PostgreSQL` storage for production use.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Which backend to create.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
    /// Insert [`SAMPLE_TASKS`] when the store starts out empty.
    pub seed_sample_tasks: bool,
}

impl RepositoryConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RepositoryConfigBuilder {
        RepositoryConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let storage_mode = match env::var("STORAGE_MODE") {
            Ok(value) => value.parse()?,
            Err(env::VarError::NotPresent) => StorageMode::default(),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigurationError::InvalidStorageMode(
                    "<non-UTF-8 value>".to_string(),
                ));
            }
        };

        // Empty/whitespace-only is treated as unset
        let database_url = env::var("DATABASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let seed_sample_tasks = env::var("SEED_SAMPLE_TASKS")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        let config = Self {
            storage_mode,
            database_url,
            seed_sample_tasks,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if `PostgreSQL` is
    /// selected without a URL.
    pub const fn validate(&self) -> Result<(), ConfigurationError> {
        if matches!(self.storage_mode, StorageMode::Postgres) && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

/// Parses a boolean flag the way environment switches are usually written.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Builder for `RepositoryConfig`.
///
/// ```ignore
/// let config = RepositoryConfig::builder()
///     .storage_mode(StorageMode::Postgres)
///     .database_url("postgres://localhost/taskboard")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfigBuilder {
    storage_mode: StorageMode,
    database_url: Option<String>,
    seed_sample_tasks: bool,
}

impl RepositoryConfigBuilder {
    /// Sets the storage mode.
    #[must_use]
    pub const fn storage_mode(mut self, mode: StorageMode) -> Self {
        self.storage_mode = mode;
        self
    }

    /// Sets the `PostgreSQL` database URL.
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Enables or disables sample data seeding.
    #[must_use]
    pub const fn seed_sample_tasks(mut self, seed: bool) -> Self {
        self.seed_sample_tasks = seed;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<RepositoryConfig, ConfigurationError> {
        let config = RepositoryConfig {
            storage_mode: self.storage_mode,
            database_url: self.database_url,
            seed_sample_tasks: self.seed_sample_tasks,
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while reading repository configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// `PORT` is not a number in `1..=65535`.
    #[error("Invalid port: '{0}'")]
    InvalidPort(String),

    /// `HOST:PORT` is not a valid socket address.
    #[error("Invalid server address: '{0}'")]
    InvalidAddress(String),
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// Seeding sample data failed.
    #[error("Failed to seed sample tasks: {0}")]
    Seed(RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Creates the task repository selected by a [`RepositoryConfig`].
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a factory for the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this factory was built with.
    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Creates the repository and seeds it if configured to.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the configuration is invalid, the database
    /// cannot be reached, or seeding fails.
    pub async fn create(&self) -> Result<Arc<dyn TaskRepository>, FactoryError> {
        self.config.validate()?;

        let repository: Arc<dyn TaskRepository> = match self.config.storage_mode {
            StorageMode::InMemory => {
                tracing::info!("Using in-memory task storage");
                Arc::new(InMemoryTaskRepository::new())
            }
            StorageMode::Postgres => {
                let url = self
                    .config
                    .database_url
                    .as_deref()
                    .ok_or(ConfigurationError::MissingDatabaseUrl)?;
                tracing::info!("Connecting to PostgreSQL task storage");
                let repository = PostgresTaskRepository::connect(url)
                    .await
                    .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;
                Arc::new(repository)
            }
        };

        if self.config.seed_sample_tasks {
            let inserted = Self::seed_sample_tasks(repository.as_ref())
                .await
                .map_err(FactoryError::Seed)?;
            tracing::info!(inserted, "Sample tasks seeded");
        }

        Ok(repository)
    }

    /// Inserts [`SAMPLE_TASKS`] if the repository is empty.
    ///
    /// Returns the number of tasks inserted (zero when the store already had
    /// data).
    ///
    /// # Errors
    ///
    /// Returns the first `RepositoryError` raised by the store.
    pub async fn seed_sample_tasks(repository: &dyn TaskRepository) -> Result<usize, RepositoryError> {
        if repository.count().await? > 0 {
            return Ok(0);
        }

        for (text, completed) in SAMPLE_TASKS {
            let task = repository.create(text).await?;
            if completed {
                repository
                    .update(&task.task_id, &TaskPatch::new().with_completed(true))
                    .await?;
            }
        }

        Ok(SAMPLE_TASKS.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
