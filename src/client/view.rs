//! Client-side view model.
//!
//! [`TodoBoard`] keeps a local replica of the todo list and applies a server
//! response only once it has been confirmed. A failed request is logged and
//! leaves the replica exactly as it was.

use crate::api::{HealthResponse, TodoResponse, UpdateTodoRequest};
use crate::config::BuildInfo;

use super::api::TodoApi;

// =============================================================================
// Backend Status
// =============================================================================

/// What the status panel shows about the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    /// Health has not been checked yet.
    Checking,
    Online(HealthSummary),
    Offline,
}

impl BackendStatus {
    /// Short label: `checking`, `online` or `offline`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Online(_) => "online",
            Self::Offline => "offline",
        }
    }
}

/// The parts of a health report the client displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthSummary {
    pub environment: String,
    pub version: String,
    pub timestamp: String,
    pub build: BuildInfo,
}

impl From<HealthResponse> for HealthSummary {
    fn from(report: HealthResponse) -> Self {
        Self {
            environment: report.environment,
            version: report.version,
            timestamp: report.timestamp,
            build: report.build,
        }
    }
}

// =============================================================================
// Todo Board
// =============================================================================

/// Local replica of the todo list plus loading and backend state.
#[derive(Debug)]
pub struct TodoBoard<A: TodoApi> {
    api: A,
    todos: Vec<TodoResponse>,
    loading: bool,
    backend: BackendStatus,
}

impl<A: TodoApi> TodoBoard<A> {
    /// Creates an unmounted board: loading, empty, status unchecked.
    pub const fn new(api: A) -> Self {
        Self {
            api,
            todos: Vec::new(),
            loading: true,
            backend: BackendStatus::Checking,
        }
    }

    pub fn todos(&self) -> &[TodoResponse] {
        &self.todos
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn backend_status(&self) -> &BackendStatus {
        &self.backend
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Id of the todo shown on 1-based `row`.
    pub fn id_at(&self, row: usize) -> Option<&str> {
        row.checked_sub(1)
            .and_then(|index| self.todos.get(index))
            .map(|todo| todo.id.as_str())
    }

    /// Loads the list and checks backend health once.
    pub async fn mount(&mut self) {
        self.load().await;
        self.check_health().await;
    }

    /// Fetches the list from the server. On failure the replica is kept and
    /// the error is logged; there is no retry.
    pub async fn load(&mut self) {
        self.loading = true;
        match self.api.list().await {
            Ok(todos) => self.todos = todos,
            Err(error) => tracing::error!(%error, "Error fetching todos"),
        }
        self.loading = false;
    }

    /// Creates a todo from user input and appends it.
    ///
    /// Input is trimmed; blank input is ignored without a request. Returns
    /// whether the replica changed.
    pub async fn add(&mut self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        match self.api.create(text).await {
            Ok(todo) => {
                self.todos.push(todo);
                true
            }
            Err(error) => {
                tracing::error!(%error, "Error adding todo");
                false
            }
        }
    }

    /// Flips `completed` on the todo with `id`, sending the inverse of the
    /// local value. Returns whether the replica changed.
    pub async fn toggle(&mut self, id: &str) -> bool {
        let Some(completed) = self
            .todos
            .iter()
            .find(|todo| todo.id == id)
            .map(|todo| todo.completed)
        else {
            tracing::warn!(todo_id = id, "Toggle requested for unknown todo");
            return false;
        };

        let request = UpdateTodoRequest {
            text: None,
            completed: Some(!completed),
        };

        match self.api.update(id, &request).await {
            Ok(updated) => {
                for todo in &mut self.todos {
                    if todo.id == id {
                        *todo = updated.clone();
                    }
                }
                true
            }
            Err(error) => {
                tracing::error!(%error, todo_id = id, "Error updating todo");
                false
            }
        }
    }

    /// Deletes the todo with `id`. Returns whether the replica changed.
    pub async fn delete(&mut self, id: &str) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                self.todos.retain(|todo| todo.id != id);
                true
            }
            Err(error) => {
                tracing::error!(%error, todo_id = id, "Error deleting todo");
                false
            }
        }
    }

    /// Queries the health endpoint and records the result.
    pub async fn check_health(&mut self) {
        self.backend = match self.api.health().await {
            Ok(report) => BackendStatus::Online(HealthSummary::from(report)),
            Err(error) => {
                tracing::warn!(%error, "Backend health check failed");
                BackendStatus::Offline
            }
        };
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::health::{DatabaseHealth, MemoryUsage};
    use crate::client::api::ClientError;
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use std::sync::Mutex;

    /// Scripted [`TodoApi`] that records what it was asked to do.
    #[derive(Debug, Default)]
    pub(crate) struct FakeApi {
        pub todos: Vec<TodoResponse>,
        pub failing: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn fail_or<T>(&self, value: T) -> Result<T, ClientError> {
            if self.failing {
                Err(ClientError::ConnectionFailed("refused".to_string()))
            } else {
                Ok(value)
            }
        }
    }

    pub(crate) fn todo(id: &str, text: &str, completed: bool) -> TodoResponse {
        TodoResponse {
            id: id.to_string(),
            text: text.to_string(),
            completed,
            created_at: "2024-05-01T12:30:00.000Z".to_string(),
            updated_at: "2024-05-01T12:30:00.000Z".to_string(),
        }
    }

    pub(crate) fn health_report() -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            timestamp: "2024-05-01T12:30:00.000Z".to_string(),
            environment: "test".to_string(),
            version: "1.0.0".to_string(),
            database: DatabaseHealth {
                status: "connected".to_string(),
                name: "in_memory".to_string(),
            },
            uptime: 1.5,
            memory: MemoryUsage::default(),
            build: BuildInfo::default(),
        }
    }

    #[async_trait]
    impl TodoApi for FakeApi {
        async fn list(&self) -> Result<Vec<TodoResponse>, ClientError> {
            self.record("list".to_string());
            self.fail_or(self.todos.clone())
        }

        async fn create(&self, text: &str) -> Result<TodoResponse, ClientError> {
            self.record(format!("create {text}"));
            self.fail_or(todo("new", text, false))
        }

        async fn update(
            &self,
            id: &str,
            request: &UpdateTodoRequest,
        ) -> Result<TodoResponse, ClientError> {
            let completed = request.completed.unwrap_or(false);
            self.record(format!("update {id} completed={completed}"));
            let text = self
                .todos
                .iter()
                .find(|todo| todo.id == id)
                .map_or_else(String::new, |todo| todo.text.clone());
            self.fail_or(todo(id, &text, completed))
        }

        async fn delete(&self, id: &str) -> Result<(), ClientError> {
            self.record(format!("delete {id}"));
            self.fail_or(())
        }

        async fn health(&self) -> Result<HealthResponse, ClientError> {
            self.record("health".to_string());
            self.fail_or(health_report())
        }
    }

    #[fixture]
    fn seeded() -> FakeApi {
        FakeApi {
            todos: vec![
                todo("a", "Deploy with Docker", false),
                todo("b", "Learn Jenkins", true),
            ],
            ..FakeApi::default()
        }
    }

    #[fixture]
    fn failing() -> FakeApi {
        FakeApi {
            failing: true,
            ..FakeApi::default()
        }
    }

    async fn mounted(api: FakeApi) -> TodoBoard<FakeApi> {
        let mut board = TodoBoard::new(api);
        board.mount().await;
        board
    }

    fn calls(board: &TodoBoard<FakeApi>) -> Vec<String> {
        board.api().calls.lock().unwrap().clone()
    }

    #[rstest]
    fn test_new_board_is_loading() {
        let board = TodoBoard::new(FakeApi::default());
        assert!(board.is_loading());
        assert!(board.todos().is_empty());
        assert_eq!(board.backend_status(), &BackendStatus::Checking);
    }

    #[rstest]
    #[tokio::test]
    async fn test_mount_loads_and_checks_health(seeded: FakeApi) {
        let board = mounted(seeded).await;

        assert!(!board.is_loading());
        assert_eq!(board.todos().len(), 2);
        assert_eq!(board.backend_status().label(), "online");
        assert_eq!(calls(&board), vec!["list", "health"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_mount_failure_leaves_list_empty_and_offline(failing: FakeApi) {
        let board = mounted(failing).await;

        assert!(!board.is_loading());
        assert!(board.todos().is_empty());
        assert_eq!(board.backend_status(), &BackendStatus::Offline);
    }

    #[rstest]
    #[tokio::test]
    async fn test_add_trims_and_appends(seeded: FakeApi) {
        let mut board = mounted(seeded).await;

        assert!(board.add("  Write tests  ").await);

        assert_eq!(board.todos().len(), 3);
        assert_eq!(board.todos()[2].text, "Write tests");
        assert!(calls(&board).contains(&"create Write tests".to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn test_add_blank_sends_nothing(seeded: FakeApi, #[case] input: &str) {
        let mut board = mounted(seeded).await;

        assert!(!board.add(input).await);

        assert_eq!(board.todos().len(), 2);
        assert_eq!(calls(&board), vec!["list", "health"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_toggle_sends_inverse_and_replaces(seeded: FakeApi) {
        let mut board = mounted(seeded).await;

        assert!(board.toggle("b").await);

        assert!(calls(&board).contains(&"update b completed=false".to_string()));
        assert!(!board.todos()[1].completed);
        assert_eq!(board.todos()[1].text, "Learn Jenkins");
    }

    #[rstest]
    #[tokio::test]
    async fn test_toggle_unknown_id_sends_nothing(seeded: FakeApi) {
        let mut board = mounted(seeded).await;

        assert!(!board.toggle("missing").await);
        assert_eq!(calls(&board), vec!["list", "health"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_removes_local_record(seeded: FakeApi) {
        let mut board = mounted(seeded).await;

        assert!(board.delete("a").await);

        assert_eq!(board.todos().len(), 1);
        assert_eq!(board.id_at(1), Some("b"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_failures_leave_replica_untouched() {
        let mut board = mounted(FakeApi {
            todos: vec![todo("a", "Learn Jenkins", false)],
            ..FakeApi::default()
        })
        .await;
        let before = board.todos().to_vec();

        // Flip the fake to failing after a successful mount.
        board.api.failing = true;

        assert!(!board.add("Deploy").await);
        assert!(!board.toggle("a").await);
        assert!(!board.delete("a").await);
        assert_eq!(board.todos(), before.as_slice());
    }

    #[rstest]
    fn test_id_at_is_one_based() {
        let mut board = TodoBoard::new(FakeApi::default());
        board.todos = vec![todo("a", "first", false), todo("b", "second", false)];

        assert_eq!(board.id_at(0), None);
        assert_eq!(board.id_at(1), Some("a"));
        assert_eq!(board.id_at(2), Some("b"));
        assert_eq!(board.id_at(3), None);
    }
}
