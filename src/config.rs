//! Runtime configuration read from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `5000`)
//! - `APP_ENV`: Environment name reported by health checks (default: `development`)
//! - `BUILD_NUMBER`, `BUILD_ID`, `JOB_NAME`, `GIT_COMMIT`: CI build metadata
//!
//! Storage selection lives in [`crate::infrastructure::RepositoryConfig`].

use std::env;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::infrastructure::ConfigurationError;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ENVIRONMENT: &str = "development";

/// Reads a variable, treating empty and whitespace-only values as unset.
fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Address the HTTP server binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST` and `PORT`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPort` if `PORT` is not a valid
    /// port number.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let host = read_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match read_var("PORT") {
            Some(value) => parse_port(&value)?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    /// Resolves the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAddress` if `host:port` does not
    /// parse as a socket address.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigurationError::InvalidAddress(address))
    }
}

/// Parses a `PORT` value.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidPort` for anything that is not a
/// number in `1..=65535`.
pub fn parse_port(value: &str) -> Result<u16, ConfigurationError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigurationError::InvalidPort(value.to_string())),
    }
}

// =============================================================================
// Build Metadata
// =============================================================================

/// CI build metadata surfaced by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub build_number: String,
    pub build_id: String,
    pub job_name: String,
    pub git_commit: String,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            build_number: "local".to_string(),
            build_id: "dev".to_string(),
            job_name: "local-development".to_string(),
            git_commit: "unknown".to_string(),
        }
    }
}

impl BuildInfo {
    /// Reads `BUILD_NUMBER`, `BUILD_ID`, `JOB_NAME` and `GIT_COMMIT`, falling
    /// back to the local-development defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            build_number: read_var("BUILD_NUMBER").unwrap_or(defaults.build_number),
            build_id: read_var("BUILD_ID").unwrap_or(defaults.build_id),
            job_name: read_var("JOB_NAME").unwrap_or(defaults.job_name),
            git_commit: read_var("GIT_COMMIT").unwrap_or(defaults.git_commit),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Immutable settings shared with every handler through `AppState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment environment name, e.g. `development` or `production`.
    pub environment: String,
    /// API version reported by `/` and the health endpoints.
    pub version: String,
    pub build: BuildInfo,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build: BuildInfo::default(),
        }
    }
}

impl AppConfig {
    /// Reads `APP_ENV` and the build metadata variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            environment: read_var("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            build: BuildInfo::from_env(),
            ..Self::default()
        }
    }

    /// Replaces the environment name.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Replaces the build metadata.
    #[must_use]
    pub fn with_build(mut self, build: BuildInfo) -> Self {
        self.build = build;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
