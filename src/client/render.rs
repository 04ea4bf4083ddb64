//! Plain-text rendering of a [`TodoBoard`].

use super::api::TodoApi;
use super::view::{BackendStatus, TodoBoard};

pub const TITLE: &str = "Task Board";
pub const LOADING: &str = "Loading your todos...";
pub const EMPTY: &str = "No todos yet! Add one above.";

/// Renders header, list (or loading/empty line) and the backend status panel.
pub fn render_board<A: TodoApi>(board: &TodoBoard<A>) -> String {
    let mut lines = vec![TITLE.to_string(), "=".repeat(TITLE.len())];

    if board.is_loading() {
        lines.push(LOADING.to_string());
        return join_lines(&lines);
    }

    if board.todos().is_empty() {
        lines.push(EMPTY.to_string());
    }

    lines.extend(board.todos().iter().enumerate().map(|(index, todo)| {
        let (marker, action) = if todo.completed {
            ("[x]", "Undo")
        } else {
            ("[ ]", "Complete")
        };
        format!(
            "{:>3}. {marker} {}  ({action} | Delete)",
            index + 1,
            todo.text
        )
    }));

    lines.push(String::new());
    lines.extend(status_lines(board.backend_status()));
    join_lines(&lines)
}

fn status_lines(status: &BackendStatus) -> Vec<String> {
    let mut lines = vec![format!("Backend Status: {}", status.label())];
    if let BackendStatus::Online(summary) = status {
        lines.push(format!("  Environment: {}", summary.environment));
        lines.push(format!("  Build: {}", summary.version));
        lines.push(format!("  Last Updated: {}", summary.timestamp));
        lines.push(format!(
            "  Build Number: {} (job {}, commit {})",
            summary.build.build_number, summary.build.job_name, summary.build.git_commit
        ));
    }
    lines
}

/// Joins with a trailing newline after every line.
fn join_lines(lines: &[String]) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
