//! Client view layer.
//!
//! A view model over the Todo API that keeps a local replica of the list,
//! plus the text rendering and command parsing used by `taskboard-client`.

pub mod api;
pub mod command;
pub mod render;
pub mod view;

pub use api::{ClientError, DEFAULT_API_URL, HttpTodoApi, TodoApi};
pub use command::{Command, CommandError};
pub use render::render_board;
pub use view::{BackendStatus, HealthSummary, TodoBoard};
