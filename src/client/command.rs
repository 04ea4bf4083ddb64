//! Commands accepted by the terminal client.

use std::str::FromStr;

use thiserror::Error;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    /// 1-based row number.
    Toggle(usize),
    /// 1-based row number.
    Delete(usize),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: '{0}'. Type 'help' for the list of commands")]
    Unknown(String),

    #[error("'{command}' expects a row number, got '{argument}'")]
    InvalidRow { command: String, argument: String },
}

pub const HELP: &str = "\
Commands:
  add <text>     add a todo
  toggle <n>     complete or undo row n
  delete <n>     delete row n
  refresh        reload the list
  help           show this help
  quit           exit";

fn parse_row(command: &str, argument: &str) -> Result<usize, CommandError> {
    argument
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .ok_or_else(|| CommandError::InvalidRow {
            command: command.to_string(),
            argument: argument.to_string(),
        })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        match command.to_lowercase().as_str() {
            // Blank text is passed through; the board ignores it.
            "add" | "a" => Ok(Self::Add(argument.to_string())),
            "toggle" | "t" => parse_row(command, argument).map(Self::Toggle),
            "delete" | "d" | "rm" => parse_row(command, argument).map(Self::Delete),
            "refresh" | "r" => Ok(Self::Refresh),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}
