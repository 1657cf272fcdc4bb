//! Status and priority enums

use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status of a task. Each status value is one board column.
///
/// The set is a closed contract with the backend; anything outside it is
/// rejected at the parsing boundary rather than propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Columns in board display order
    pub const COLUMN_ORDER: [TaskStatus; 3] =
        [Self::NotStarted, Self::InProgress, Self::Completed];

    /// Stable droppable id of this status's column
    pub fn column_id(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Droppable id of the column's edge drop zone, which always resolves
    /// to append-at-end regardless of pointer position
    pub fn gutter_id(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED:gutter",
            Self::InProgress => "IN_PROGRESS:gutter",
            Self::Completed => "COMPLETED:gutter",
        }
    }

    /// Check if this is the terminal column
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_id())
    }
}

impl FromStr for TaskStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(BoardError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Relative priority shown on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(label)
    }
}
