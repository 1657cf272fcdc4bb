//! ReorderEngine - turn a resolved drop into a new store sequence
//!
//! Pure: reads the store, returns the sequence the optimistic apply should
//! install. No-op drops are detected here, before anything is mutated, so
//! they can never reach the persistence layer.

use crate::drag::InsertionIndicator;
use crate::error::{BoardError, Result};
use crate::insertion::{DropTarget, HoverPosition};
use crate::store::TaskStore;
use crate::types::{Task, TaskId, TaskStatus};

/// A computed move, ready to apply
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderPlan {
    /// The sequence after the move
    pub tasks: Vec<Task>,
    pub task_id: TaskId,
    pub from_status: TaskStatus,
    pub to_status: TaskStatus,
    /// Slot within the destination column the task was inserted at
    pub insertion_index: usize,
}

impl ReorderPlan {
    /// Whether the move crossed columns and therefore needs persisting
    pub fn status_changed(&self) -> bool {
        self.from_status != self.to_status
    }
}

/// Why a drop was discarded without touching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// Drop arrived with no active drag session
    NotDragging,
    /// The card was dropped onto itself
    DroppedOnSelf,
    /// Destination column and slot equal the card's current ones
    SamePosition,
    /// The drop id resolved to nothing known
    InvalidTarget,
    /// The dragged card disappeared mid-interaction
    TaskVanished,
}

/// Outcome of reorder computation
#[derive(Debug, Clone, PartialEq)]
pub enum ReorderStep {
    Apply(ReorderPlan),
    Skip(NoOpReason),
}

/// Combine a resolved drop target and the last insertion indicator into a
/// new sequence.
///
/// Column and gutter targets append at the end of the destination column.
/// A task target inserts above or below it per the indicator; released
/// directly over a card with no recorded indicator, the drop lands below
/// it. All slot arithmetic runs against the destination column with the
/// moved card already excluded.
pub fn compute_reorder(
    store: &TaskStore,
    task_id: &TaskId,
    target: &DropTarget,
    indicator: Option<&InsertionIndicator>,
) -> Result<ReorderStep> {
    let source = store
        .get(task_id)
        .ok_or_else(|| BoardError::task_not_found(task_id))?;
    let from_status = source.status;

    let (to_status, insertion_index) = match target {
        DropTarget::Task(target_id) => {
            if target_id == task_id {
                return Ok(ReorderStep::Skip(NoOpReason::DroppedOnSelf));
            }
            let target_task = store
                .get(target_id)
                .ok_or_else(|| BoardError::task_not_found(target_id))?;
            let to_status = target_task.status;

            // Target's slot in the destination column, moved card excluded
            let mut base = 0usize;
            for t in store.tasks() {
                if t.status != to_status || &t.id == task_id {
                    continue;
                }
                if &t.id == target_id {
                    break;
                }
                base += 1;
            }

            let index = match indicator {
                Some(ind) if ind.target_task_id == *target_id => match ind.position {
                    HoverPosition::Above => base,
                    HoverPosition::Below => base + 1,
                },
                _ => base + 1,
            };
            (to_status, index)
        }
        DropTarget::Column(status) | DropTarget::Gutter(status) => {
            let len = store
                .tasks()
                .iter()
                .filter(|t| t.status == *status && &t.id != task_id)
                .count();
            (*status, len)
        }
    };

    // A card's bucket index equals the slot that re-inserting it into the
    // self-excluded column would have to hit to change nothing.
    if to_status == from_status && store.index_in_bucket(task_id) == Some(insertion_index) {
        return Ok(ReorderStep::Skip(NoOpReason::SamePosition));
    }

    let tasks = store.move_task(task_id, to_status, insertion_index)?;
    Ok(ReorderStep::Apply(ReorderPlan {
        tasks,
        task_id: task_id.clone(),
        from_status,
        to_status,
        insertion_index,
    }))
}
