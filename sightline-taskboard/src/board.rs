//! BoardController - page-level orchestration of the task board
//!
//! Owns the store, the drag session and the persistence coordinator, wired
//! together explicitly at construction. Drag handlers are synchronous: the
//! board reflects every interaction locally before anything touches the
//! network, and drag-session errors are absorbed here rather than surfaced
//! to the interaction layer.

use crate::drag::{DragSession, InsertionIndicator};
use crate::error::{BoardError, Result};
use crate::events::BoardEvent;
use crate::insertion::{resolve_drop_target, resolve_hover_position, DropTarget, RowBounds};
use crate::persist::{PersistenceCoordinator, StatusGateway};
use crate::reorder::{compute_reorder, NoOpReason, ReorderPlan, ReorderStep};
use crate::store::{lock_store, SharedStore, TaskStore};
use crate::types::{ReportRunId, Task, TaskId, TaskStatus};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// What a completed drop did, reported for observability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The board now shows the new layout; persistence runs in the
    /// background when the move crossed columns
    Moved {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
    /// Nothing changed and nothing was sent
    NoOp(NoOpReason),
}

/// Controller for one task board
pub struct BoardController {
    store: SharedStore,
    session: DragSession,
    coordinator: PersistenceCoordinator,
    events: UnboundedSender<BoardEvent>,
}

impl BoardController {
    /// Create a controller for one report run. Returns the receiving half
    /// of the event channel for the notification surface.
    pub fn new(
        report_run_id: ReportRunId,
        gateway: Arc<dyn StatusGateway>,
    ) -> (Self, UnboundedReceiver<BoardEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store: SharedStore = Arc::new(Mutex::new(TaskStore::new()));
        let coordinator = PersistenceCoordinator::new(
            gateway,
            report_run_id,
            Arc::clone(&store),
            events.clone(),
        );
        (
            Self {
                store,
                session: DragSession::new(),
                coordinator,
                events,
            },
            receiver,
        )
    }

    // =========================================================================
    // Inbound data
    // =========================================================================

    /// Replace the board with an authoritative task list (mount or explicit
    /// refresh). The server wins: outstanding persistence requests are
    /// forgotten so their late failures cannot roll back refreshed data,
    /// and any in-progress drag is discarded.
    pub fn seed(&mut self, tasks: Vec<Task>) {
        self.coordinator.abandon_all();
        self.session.cancel();
        lock_store(&self.store).replace_all(tasks);
    }

    // =========================================================================
    // Read views for rendering
    // =========================================================================

    /// The full ordered task list
    pub fn tasks(&self) -> Vec<Task> {
        lock_store(&self.store).tasks().to_vec()
    }

    /// One column, in display order
    pub fn column(&self, status: TaskStatus) -> Vec<Task> {
        lock_store(&self.store)
            .bucket(status)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The card currently being dragged
    pub fn active_task(&self) -> Option<TaskId> {
        self.session.active_task().cloned()
    }

    /// The current insertion indicator
    pub fn indicator(&self) -> Option<InsertionIndicator> {
        self.session.indicator().cloned()
    }

    /// Check if a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    /// Number of unresolved status updates
    pub fn in_flight_count(&self) -> usize {
        self.coordinator.in_flight_count()
    }

    // =========================================================================
    // Drag interaction
    // =========================================================================

    /// Pointer-down on a card
    pub fn drag_start(&mut self, task_id: &TaskId) {
        if !lock_store(&self.store).contains(task_id) {
            tracing::debug!(task = %task_id, "drag start ignored, unknown task");
            return;
        }
        self.session.start(task_id.clone());
    }

    /// Pointer moved over a droppable. Hovering another card computes an
    /// above/below indicator from the pointer geometry; hovering a column
    /// body, a gutter, the dragged card itself or anything unknown clears
    /// it (those drops append, no marker is shown).
    pub fn drag_over(&mut self, over_id: &str, pointer_y: f64, bounds: RowBounds) {
        let Some(active) = self.session.active_task().cloned() else {
            return;
        };

        let indicator = {
            let store = lock_store(&self.store);
            match resolve_drop_target(over_id, &store) {
                Ok(DropTarget::Task(target_id)) if target_id != active => {
                    store.get(&target_id).map(|target| InsertionIndicator {
                        target_task_id: target_id.clone(),
                        position: resolve_hover_position(pointer_y, bounds),
                        target_status: target.status,
                    })
                }
                Ok(_) => None,
                Err(err) => {
                    tracing::debug!(%err, "hover target ignored");
                    None
                }
            }
        };

        self.session.set_indicator(indicator);
    }

    /// Pointer released over a droppable. Applies the reorder locally,
    /// then fires the status update in the background when the move
    /// crossed columns. Intra-column reordering is a local concept and
    /// never calls the backend.
    pub fn drag_end(&mut self, over_id: &str) -> DropOutcome {
        let Some((task_id, indicator)) = self.session.finish() else {
            return DropOutcome::NoOp(NoOpReason::NotDragging);
        };

        let mut store = lock_store(&self.store);

        let target = match resolve_drop_target(over_id, &store) {
            Ok(target) => target,
            Err(err) => {
                tracing::debug!(task = %task_id, %err, "drop discarded");
                return DropOutcome::NoOp(NoOpReason::InvalidTarget);
            }
        };

        if matches!(&target, DropTarget::Task(target_id) if target_id == &task_id) {
            tracing::debug!(task = %task_id, "dropped onto itself");
            return DropOutcome::NoOp(NoOpReason::DroppedOnSelf);
        }

        let step = match compute_reorder(&store, &task_id, &target, indicator.as_ref()) {
            Ok(step) => step,
            Err(err) => {
                tracing::debug!(task = %task_id, %err, "drop abandoned");
                return DropOutcome::NoOp(NoOpReason::TaskVanished);
            }
        };

        let plan = match step {
            ReorderStep::Skip(reason) => {
                tracing::debug!(task = %task_id, ?reason, "drop is a no-op");
                return DropOutcome::NoOp(reason);
            }
            ReorderStep::Apply(plan) => plan,
        };

        let previous = store.get(&task_id).map(Task::status_snapshot);
        let ReorderPlan {
            tasks,
            from_status,
            to_status,
            ..
        } = plan;
        store.apply(tasks);
        drop(store);

        tracing::debug!(task = %task_id, from = %from_status, to = %to_status, "reorder applied");
        let _ = self.events.send(BoardEvent::TaskMoved {
            task_id: task_id.clone(),
            from: from_status,
            to: to_status,
        });

        if from_status != to_status {
            if let Some(previous) = previous {
                self.coordinator
                    .submit_status_change(task_id.clone(), previous, to_status);
            }
        }

        DropOutcome::Moved {
            task_id,
            from: from_status,
            to: to_status,
        }
    }

    /// Escape or drop outside any droppable: discard the session without
    /// touching the store or the backend
    pub fn drag_cancel(&mut self) {
        self.session.cancel();
    }

    // =========================================================================
    // Direct status changes
    // =========================================================================

    /// Change a task's status without a drag (e.g. the card's complete
    /// checkbox). Appends to the destination column and goes through the
    /// same optimistic-then-persist path as a cross-column drop. A
    /// same-status call is a no-op.
    pub fn set_status(&mut self, task_id: &TaskId, status: TaskStatus) -> Result<()> {
        let mut store = lock_store(&self.store);
        let task = store
            .get(task_id)
            .ok_or_else(|| BoardError::task_not_found(task_id))?;
        let from = task.status;
        if from == status {
            return Ok(());
        }
        let previous = task.status_snapshot();

        let append_at = store
            .tasks()
            .iter()
            .filter(|t| t.status == status)
            .count();
        let tasks = store.move_task(task_id, status, append_at)?;
        store.apply(tasks);
        drop(store);

        let _ = self.events.send(BoardEvent::TaskMoved {
            task_id: task_id.clone(),
            from,
            to: status,
        });
        self.coordinator
            .submit_status_change(task_id.clone(), previous, status);
        Ok(())
    }

    /// Move a task to the terminal column
    pub fn complete(&mut self, task_id: &TaskId) -> Result<()> {
        self.set_status(task_id, TaskStatus::Completed)
    }

    /// Wait for every outstanding persistence request (shutdown, tests)
    pub async fn flush(&self) {
        self.coordinator.flush().await;
    }
}
