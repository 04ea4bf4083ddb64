//! Health reporting.
//!
//! Two read-only endpoints: a basic report used by container probes and the
//! client's status panel, and a detailed one with per-service status and
//! system facts. Neither has side effects; failures are turned into an
//! `unhealthy` payload with status 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dto::ApiJson;
use super::handlers::AppState;
use crate::config::BuildInfo;
use crate::domain::Timestamp;
use crate::infrastructure::RepositoryError;

// =============================================================================
// Payloads
// =============================================================================

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the report could be collected.
    pub status: String,
    pub timestamp: String,
    pub environment: String,
    pub version: String,
    pub database: DatabaseHealth,
    /// Seconds since the server started.
    pub uptime: f64,
    pub memory: MemoryUsage,
    pub build: BuildInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseHealth {
    /// `connected` or `disconnected`.
    pub status: String,
    pub name: String,
}

/// Resident memory of the server process, in bytes.
///
/// Either figure is `None` where the platform does not expose it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss_bytes: Option<u64>,
    pub peak_rss_bytes: Option<u64>,
}

/// Body of `GET /api/health/detailed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: String,
    pub services: ServicesHealth,
    pub system: SystemInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesHealth {
    pub api: String,
    /// `operational` or `down`.
    pub database: String,
    pub todos: TodosHealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodosHealth {
    pub total: u64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    /// Minimum Rust version the server was built for.
    pub runtime_version: String,
    pub platform: String,
    pub arch: String,
    pub pid: u32,
}

impl SystemInfo {
    /// Facts about the running process.
    #[must_use]
    pub fn current() -> Self {
        Self {
            runtime_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            pid: std::process::id(),
        }
    }
}

// =============================================================================
// Unhealthy Response
// =============================================================================

/// Reasons a health report could not be produced.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("Failed to read memory usage: {0}")]
    Memory(String),

    #[error("Failed to count todos")]
    TodoCount(#[source] RepositoryError),
}

/// The 500 body: `{"status": "unhealthy", "timestamp", "error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhealthyResponse {
    pub status: String,
    pub timestamp: String,
    pub error: String,
}

impl From<HealthError> for UnhealthyResponse {
    fn from(error: HealthError) -> Self {
        match &error {
            HealthError::TodoCount(source) => {
                tracing::error!(error = %source, "Health check failed");
            }
            HealthError::Memory(_) => tracing::error!(%error, "Health check failed"),
        }
        Self {
            status: "unhealthy".to_string(),
            timestamp: Timestamp::now().to_rfc3339(),
            error: error.to_string(),
        }
    }
}

impl IntoResponse for UnhealthyResponse {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, ApiJson(self)).into_response()
    }
}

// =============================================================================
// Collection
// =============================================================================

/// Builds the basic report from the state and a memory reading.
///
/// # Errors
///
/// Returns the memory reading's error unchanged.
pub async fn collect_health(
    state: &AppState,
    memory: Result<MemoryUsage, HealthError>,
) -> Result<HealthResponse, HealthError> {
    let memory = memory?;
    let repository = &state.task_repository;

    let database_status = match repository.ping().await {
        Ok(()) => "connected",
        Err(error) => {
            tracing::warn!(%error, "Database ping failed");
            "disconnected"
        }
    };

    Ok(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
        environment: state.config.environment.clone(),
        version: state.config.version.clone(),
        database: DatabaseHealth {
            status: database_status.to_string(),
            name: repository.database_name().to_string(),
        },
        uptime: state.started_at.elapsed().as_secs_f64(),
        memory,
        build: state.config.build.clone(),
    })
}

/// Builds the detailed report.
///
/// # Errors
///
/// Returns `HealthError::TodoCount` if the store cannot count its records.
pub async fn collect_detailed_health(
    state: &AppState,
) -> Result<DetailedHealthResponse, HealthError> {
    let repository = &state.task_repository;

    let database = if repository.ping().await.is_ok() {
        "operational"
    } else {
        "down"
    };
    let total = repository.count().await.map_err(HealthError::TodoCount)?;

    Ok(DetailedHealthResponse {
        status: "healthy".to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
        services: ServicesHealth {
            api: "operational".to_string(),
            database: database.to_string(),
            todos: TodosHealth {
                total,
                status: "operational".to_string(),
            },
        },
        system: SystemInfo::current(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/health`.
///
/// # Errors
///
/// Returns 500 with an [`UnhealthyResponse`] if the report cannot be built.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<ApiJson<HealthResponse>, UnhealthyResponse> {
    collect_health(&state, read_memory_usage())
        .await
        .map(ApiJson)
        .map_err(UnhealthyResponse::from)
}

/// `GET /api/health/detailed`.
///
/// # Errors
///
/// Returns 500 with an [`UnhealthyResponse`] if the todo count fails.
pub async fn detailed_health_check(
    State(state): State<AppState>,
) -> Result<ApiJson<DetailedHealthResponse>, UnhealthyResponse> {
    collect_detailed_health(&state)
        .await
        .map(ApiJson)
        .map_err(UnhealthyResponse::from)
}

// =============================================================================
// Memory Usage
// =============================================================================

/// Reads current and peak resident set size.
///
/// # Platform Support
///
/// - **Linux**: `VmRSS` and `VmHWM` from `/proc/self/status`
/// - **macOS**: peak only, from `libc::getrusage` (`ru_maxrss`, in bytes)
/// - **Other platforms**: both `None`
///
/// # Errors
///
/// On Linux, returns `HealthError::Memory` if `/proc/self/status` cannot be
/// read.
#[allow(unsafe_code)]
pub fn read_memory_usage() -> Result<MemoryUsage, HealthError> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/self/status")
            .map_err(|error| HealthError::Memory(error.to_string()))?;
        Ok(parse_proc_status(&content))
    }

    #[cfg(target_os = "macos")]
    {
        use std::mem::MaybeUninit;

        let mut usage = MaybeUninit::<libc::rusage>::uninit();

        // SAFETY: rusage is a plain FFI structure and RUSAGE_SELF is valid for
        // the calling process. It is only read after getrusage reports success.
        let peak_rss_bytes = unsafe {
            if libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) == 0 {
                usage.assume_init().ru_maxrss.try_into().ok()
            } else {
                None
            }
        };

        Ok(MemoryUsage {
            rss_bytes: None,
            peak_rss_bytes,
        })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Ok(MemoryUsage::default())
    }
}

/// Extracts `VmRSS` and `VmHWM` (reported in kB) from `/proc/self/status`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_status(content: &str) -> MemoryUsage {
    let field_bytes = |name: &str| {
        content
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|kilobytes| kilobytes.parse::<u64>().ok())
            .map(|kilobytes| kilobytes * 1024)
    };

    MemoryUsage {
        rss_bytes: field_bytes("VmRSS:"),
        peak_rss_bytes: field_bytes("VmHWM:"),
    }
}

// =============================================================================
// Tests
// =============================================================================
