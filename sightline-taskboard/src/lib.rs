//! Task board engine for the Sightline visibility-tasks feature
//!
//! This crate implements the drag-and-drop Kanban board that tracks
//! visibility-optimization work: an ordered task collection partitioned
//! into status columns, a drag interaction state machine, pointer-geometry
//! insertion resolution, and optimistic status persistence with rollback.
//!
//! ## Overview
//!
//! - **One sequence, derived columns** - tasks live in a single ordered
//!   collection; the `NOT_STARTED` / `IN_PROGRESS` / `COMPLETED` columns
//!   are filter views that can never diverge from each other
//! - **Synchronous interaction** - drag start/over/end/cancel never await;
//!   every drop is reflected on the board before the backend hears of it
//! - **Optimistic persistence** - cross-column moves fire a background
//!   status update; a failure rolls back exactly the fields it changed and
//!   surfaces on the event channel, keyed so a stale failure can never
//!   clobber a newer move of the same task
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sightline_taskboard::{
//!     async_trait, BoardController, GatewayError, ReportRunId, RowBounds, StatusGateway,
//!     Task, TaskId, TaskStatus,
//! };
//!
//! struct RestGateway;
//!
//! #[async_trait]
//! impl StatusGateway for RestGateway {
//!     async fn update_task_status(
//!         &self,
//!         _report_run_id: &ReportRunId,
//!         _task_id: &TaskId,
//!         _new_status: TaskStatus,
//!     ) -> Result<(), GatewayError> {
//!         // PATCH the task against the reporting API here
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() {
//! let (mut board, _events) =
//!     BoardController::new(ReportRunId::new(), Arc::new(RestGateway));
//!
//! board.seed(vec![Task::new("Add FAQ schema", TaskStatus::NotStarted)]);
//!
//! let card = board.tasks()[0].id.clone();
//! board.drag_start(&card);
//! board.drag_over(TaskStatus::InProgress.column_id(), 140.0, RowBounds::new(100.0, 40.0));
//! board.drag_end(TaskStatus::InProgress.column_id());
//! # }
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! pointer-down ──▶ DragSession::start
//! pointer-move ──▶ resolve_hover_position ──▶ DragSession::set_indicator
//! pointer-up   ──▶ resolve_drop_target ──▶ compute_reorder ──▶ TaskStore::apply
//!                                                  │
//!                                                  ▼ (status changed)
//!                              PersistenceCoordinator::submit_status_change
//!                                  success ──▶ StatusPersisted event
//!                                  failure ──▶ rollback ──▶ StatusRejected event
//! ```

mod board;
mod drag;
mod error;
mod events;
mod insertion;
mod persist;
mod reorder;
mod store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Re-export the async-trait attribute so gateway implementations don't
// need their own dependency on it
pub use async_trait::async_trait;

pub use board::{BoardController, DropOutcome};
pub use drag::{DragSession, DragState, InsertionIndicator};
pub use error::{BoardError, Result};
pub use events::BoardEvent;
pub use insertion::{
    resolve_drop_target, resolve_hover_position, DropTarget, HoverPosition, RowBounds,
    GUTTER_SUFFIX,
};
pub use persist::{GatewayError, PersistenceCoordinator, StatusGateway};
pub use reorder::{compute_reorder, NoOpReason, ReorderPlan, ReorderStep};
pub use store::{SharedStore, StoreSnapshot, TaskStore};

// Re-export commonly used types
pub use types::{Priority, ReportRunId, StatusSnapshot, Task, TaskId, TaskStatus};
