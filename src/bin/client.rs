//! Terminal front end for the Task Board API.
//!
//! Mounts a [`TodoBoard`] against `TASKBOARD_API_URL` (default
//! `http://localhost:5000`), prints it, and applies one command per input
//! line until `quit` or end of input. Logs go to stderr.

use tokio::io::{AsyncBufReadExt, BufReader};

use taskboard::client::command::HELP;
use taskboard::client::{Command, DEFAULT_API_URL, HttpTodoApi, TodoApi, TodoBoard, render_board};

async fn apply<A: TodoApi>(board: &mut TodoBoard<A>, command: Command) {
    match command {
        Command::Add(text) => {
            board.add(&text).await;
        }
        Command::Toggle(row) | Command::Delete(row) if board.id_at(row).is_none() => {
            eprintln!("No todo on row {row}");
        }
        Command::Toggle(row) => {
            if let Some(id) = board.id_at(row).map(str::to_string) {
                board.toggle(&id).await;
            }
        }
        Command::Delete(row) => {
            if let Some(id) = board.id_at(row).map(str::to_string) {
                board.delete(&id).await;
            }
        }
        Command::Refresh => {
            board.load().await;
            board.check_health().await;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let base_url = std::env::var("TASKBOARD_API_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    tracing::info!(%base_url, "Connecting to Task Board API");

    let mut board = TodoBoard::new(HttpTodoApi::new(base_url));
    board.mount().await;
    println!("{}", render_board(&board));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!(%error, "Failed to read input");
                std::process::exit(1);
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                apply(&mut board, command).await;
                println!("{}", render_board(&board));
            }
            Err(error) => eprintln!("{error}"),
        }
    }
}
