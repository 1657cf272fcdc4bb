//! Board events delivered to the notification surface
//!
//! Broadcast-only payloads. The controller pushes them onto an unbounded
//! channel handed out at construction; whatever renders toasts or triggers
//! refreshes consumes them at its own pace.

use crate::types::{TaskId, TaskStatus};

/// Something the notification surface may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A card was moved and the board already shows the new layout
    TaskMoved {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    /// The backend confirmed a status change. The board is already correct;
    /// subscribers may kick off a background refresh to pick up any other
    /// server-side derived state.
    StatusPersisted { task_id: TaskId, status: TaskStatus },

    /// The backend rejected a status change. The card's status has already
    /// been rolled back to `reverted_to`; its column slot is unchanged.
    StatusRejected {
        task_id: TaskId,
        attempted: TaskStatus,
        reverted_to: TaskStatus,
        message: String,
    },
}
