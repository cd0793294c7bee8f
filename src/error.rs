use std::{io, time::Duration};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Command '{command}' failed. CommandResult = {rendering}")]
    CommandFailed { command: String, rendering: String },

    #[error("Failure to destroy task {task}.  CommandResult = {rendering}")]
    DestroyFailed { task: String, rendering: String },

    #[error("Failure to destroy all tasks. CommandResult = {rendering}")]
    DestroyAllFailed { rendering: String },

    #[error("Task named {0} was not created")]
    TaskNotFound(String),

    #[error("expected response '{expected}' but got '{actual}'")]
    Mismatch { expected: String, actual: String },

    #[error("response to '{command}' does not contain '{expected}': {rendering}")]
    UnexpectedResponse {
        command: String,
        expected: String,
        rendering: String,
    },

    #[error("command '{0}' returned no table")]
    MissingTable(String),

    #[error("no cell at row {row}, column {column} ({name})")]
    MissingCell {
        row: usize,
        column: usize,
        name: &'static str,
    },

    #[error("cell at row {row}, column {column} is not a valid {expected}: '{value}'")]
    InvalidCell {
        row: usize,
        column: usize,
        expected: &'static str,
        value: String,
    },

    #[error("Invalid task definition template: {0}")]
    Template(String),

    #[error("Failed to spawn shell '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No prompt from shell after {0:?}")]
    ResponseTimeout(Duration),

    #[error("Shell process exited")]
    ShellExited,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
