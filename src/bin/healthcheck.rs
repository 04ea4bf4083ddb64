//! Container health probe.
//!
//! Sends `GET http://HEALTHCHECK_HOST:PORT/api/health` (defaults `localhost`
//! and `5000`) with a 5 second timeout. Exits 0 on HTTP 200 and 1 on any
//! other status, connection failure or timeout.

use std::process::ExitCode;
use std::time::Duration;

use taskboard::config::{DEFAULT_PORT, parse_port};

const TIMEOUT: Duration = Duration::from_secs(5);

fn health_url() -> String {
    let host = std::env::var("HEALTHCHECK_HOST")
        .ok()
        .filter(|host| !host.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string());

    let port = match std::env::var("PORT") {
        Ok(value) => parse_port(&value).unwrap_or_else(|error| {
            tracing::warn!(%error, "Ignoring PORT, using default");
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };

    format!("http://{host}:{port}/api/health")
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let url = health_url();
    let client = match reqwest::Client::builder().timeout(TIMEOUT).build() {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    match client.get(&url).send().await {
        Ok(response) if response.status() == reqwest::StatusCode::OK => ExitCode::SUCCESS,
        Ok(response) => {
            tracing::warn!(status = %response.status(), %url, "Health check failed");
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::warn!(%error, %url, "Health check request failed");
            ExitCode::FAILURE
        }
    }
}
