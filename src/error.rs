use crate::domain::TaskId;
use thiserror::Error;

/// Rejected user command
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("task name must not be empty")]
    EmptyName,
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
}

/// Rejected snapshot import; the current state is never touched when this is returned
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has no `tasks` array")]
    MissingTasks,
    #[error("task at index {index} is malformed: {source}")]
    MalformedTask {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("task at index {index} is invalid: {reason}")]
    InvalidTask { index: usize, reason: &'static str },
    #[error("task id {0} appears more than once")]
    DuplicateId(TaskId),
    #[error("snapshot settings are invalid: {0}")]
    InvalidSettings(#[from] CommandError),
}
