//! End-to-end tests: the client view layer against a live server.
//!
//! The router is served on an ephemeral local port and driven through
//! `HttpTodoApi`, so requests cross a real socket.

mod common;

use std::net::SocketAddr;

use rstest::rstest;
use tokio::net::TcpListener;

use common::{create_test_app, create_test_app_state};
use taskboard::api::AppState;
use taskboard::client::{BackendStatus, HttpTodoApi, TodoApi, TodoBoard, render_board};

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = create_test_app(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn mounted_board(state: AppState) -> TodoBoard<HttpTodoApi> {
    let address = spawn_server(state).await;
    let mut board = TodoBoard::new(HttpTodoApi::new(format!("http://{address}")));
    board.mount().await;
    board
}

#[rstest]
#[tokio::test]
async fn test_mount_against_live_server() {
    let state = create_test_app_state();
    state.task_repository.create("Learn Jenkins").await.unwrap();

    let board = mounted_board(state).await;

    assert!(!board.is_loading());
    assert_eq!(board.todos().len(), 1);
    assert_eq!(board.todos()[0].text, "Learn Jenkins");
    match board.backend_status() {
        BackendStatus::Online(summary) => {
            assert_eq!(summary.environment, "development");
            assert_eq!(summary.version, "1.0.0");
            assert_eq!(summary.build.build_number, "local");
        }
        other => panic!("Expected online status, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn test_add_toggle_delete_round_trip() {
    let state = create_test_app_state();
    let mut board = mounted_board(state.clone()).await;

    assert!(board.add("  Deploy with Docker  ").await);
    let id = board.id_at(1).unwrap().to_string();
    assert_eq!(board.todos()[0].text, "Deploy with Docker");

    assert!(board.toggle(&id).await);
    assert!(board.todos()[0].completed);
    assert!(render_board(&board).contains("[x] Deploy with Docker  (Undo | Delete)"));

    assert!(board.toggle(&id).await);
    assert!(!board.todos()[0].completed);

    assert!(board.delete(&id).await);
    assert!(board.todos().is_empty());
    assert_eq!(state.task_repository.count().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn test_server_errors_leave_replica_untouched() {
    let state = create_test_app_state();
    let task = state.task_repository.create("Learn Jenkins").await.unwrap();
    let mut board = mounted_board(state.clone()).await;

    // Remove the record behind the client's back.
    state.task_repository.delete(&task.task_id).await.unwrap();
    let before = board.todos().to_vec();

    assert!(!board.toggle(&task.task_id.to_string()).await);
    assert!(!board.delete(&task.task_id.to_string()).await);
    assert_eq!(board.todos(), before.as_slice());
}

#[rstest]
#[tokio::test]
async fn test_http_api_surfaces_server_message() {
    let address = spawn_server(create_test_app_state()).await;
    let api = HttpTodoApi::new(format!("http://{address}"));

    let error = api.create("   ").await.unwrap_err();

    assert_eq!(error.to_string(), "HTTP 400: Todo text is required");
}

#[rstest]
#[tokio::test]
async fn test_unreachable_server_is_offline() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let mut board = TodoBoard::new(HttpTodoApi::new(format!("http://{address}")));
    board.mount().await;

    assert!(!board.is_loading());
    assert!(board.todos().is_empty());
    assert_eq!(board.backend_status(), &BackendStatus::Offline);
    assert!(render_board(&board).contains("Backend Status: offline"));
}
