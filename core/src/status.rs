//! User-facing status messages for command results.

use crate::bulk::BulkOutcome;
use crate::error::TodoError;

/// Message shown on the list view when the read path fails.
pub const LOAD_FAILED: &str = "Failed to load todos";

/// The write operations that report a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Update,
    Toggle,
    Delete,
    Bulk,
}

impl Command {
    fn store_failure(self) -> &'static str {
        match self {
            Command::Create => "Failed to create task",
            Command::Update => "Failed to update task",
            Command::Toggle => "Failed to update task status",
            Command::Delete => "Failed to delete task",
            Command::Bulk => "Failed to perform bulk operation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Success(String),
    Error(String),
}

impl StatusMessage {
    pub fn created() -> Self {
        StatusMessage::Success("Task added successfully".to_string())
    }

    pub fn updated() -> Self {
        StatusMessage::Success("Task updated successfully".to_string())
    }

    pub fn toggled() -> Self {
        StatusMessage::Success("Task status updated".to_string())
    }

    pub fn deleted() -> Self {
        StatusMessage::Success("Task deleted successfully".to_string())
    }

    pub fn bulk(outcome: &BulkOutcome) -> Self {
        StatusMessage::Success(outcome.to_string())
    }

    pub fn error(command: Command, err: &TodoError) -> Self {
        let text = match err {
            TodoError::Validation(msg) => msg.clone(),
            TodoError::InvalidAction(_) => "Invalid bulk action".to_string(),
            TodoError::NotFound(_) => "Task not found".to_string(),
            TodoError::Store(_) => command.store_failure().to_string(),
        };
        StatusMessage::Error(text)
    }

    /// Query-string key the message is carried under on redirect.
    pub fn key(&self) -> &'static str {
        match self {
            StatusMessage::Success(_) => "success",
            StatusMessage::Error(_) => "error",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Success(text) | StatusMessage::Error(text) => text,
        }
    }
}
