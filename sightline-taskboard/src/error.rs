//! Error types for the task board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Task not found in the store
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Drop id resolves to neither a known task nor a column or gutter
    #[error("invalid drop target: {id}")]
    InvalidDropTarget { id: String },

    /// Status value outside the closed set
    #[error("unknown status: {value}")]
    UnknownStatus { value: String },
}

impl BoardError {
    /// Create a task-not-found error
    pub fn task_not_found(id: impl ToString) -> Self {
        Self::TaskNotFound { id: id.to_string() }
    }

    /// Create an invalid-drop-target error
    pub fn invalid_drop_target(id: impl ToString) -> Self {
        Self::InvalidDropTarget { id: id.to_string() }
    }
}
