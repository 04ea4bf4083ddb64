//! HTTP access to the Todo API from the client side.
//!
//! [`TodoApi`] is the seam the view layer depends on; [`HttpTodoApi`] is the
//! real implementation over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{ApiError, CreateTodoRequest, HealthResponse, TodoResponse, UpdateTodoRequest};

/// Default server location for the client.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Client Error
// =============================================================================

/// Errors raised while talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The server could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::ConnectionFailed(error.to_string())
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::ConnectionFailed(error.to_string())
        }
    }
}

// =============================================================================
// Todo API
// =============================================================================

/// Remote operations the view layer needs.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list(&self) -> Result<Vec<TodoResponse>, ClientError>;

    async fn create(&self, text: &str) -> Result<TodoResponse, ClientError>;

    async fn update(
        &self,
        id: &str,
        request: &UpdateTodoRequest,
    ) -> Result<TodoResponse, ClientError>;

    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

/// `reqwest`-backed [`TodoApi`].
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTodoApi {
    /// Creates a client for the server at `base_url`, e.g.
    /// `http://localhost:5000`. A trailing slash is ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        self.url(&format!("/api/todos/{id}"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.timeout(self.timeout).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turns a non-success response into `ClientError::Status`, keeping the
/// server's `message` when the body is an `ApiError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ApiError>().await {
        Ok(error) => error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<TodoResponse>, ClientError> {
        self.send(self.client.get(self.url("/api/todos"))).await
    }

    async fn create(&self, text: &str) -> Result<TodoResponse, ClientError> {
        let body = CreateTodoRequest {
            text: Some(text.to_string()),
        };
        self.send(self.client.post(self.url("/api/todos")).json(&body))
            .await
    }

    async fn update(
        &self,
        id: &str,
        request: &UpdateTodoRequest,
    ) -> Result<TodoResponse, ClientError> {
        self.send(self.client.put(self.todo_url(id)).json(request))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.todo_url(id))
            .timeout(self.timeout)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .timeout(self.timeout)
            .send()
            .await?;

        // An unhealthy server still answers with a body, but it is not a report.
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(ClientError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                message: "Server reported unhealthy".to_string(),
            });
        }

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:5000", "http://localhost:5000/api/todos")]
    #[case("http://localhost:5000/", "http://localhost:5000/api/todos")]
    fn test_url_joins_base(#[case] base: &str, #[case] expected: &str) {
        let api = HttpTodoApi::new(base);
        assert_eq!(api.url("/api/todos"), expected);
    }

    #[rstest]
    fn test_todo_url() {
        let api = HttpTodoApi::new(DEFAULT_API_URL);
        assert_eq!(api.todo_url("abc"), "http://localhost:5000/api/todos/abc");
    }

    #[rstest]
    fn test_client_error_display() {
        let error = ClientError::Status {
            status: 404,
            message: "Todo not found".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 404: Todo not found");
    }
}
