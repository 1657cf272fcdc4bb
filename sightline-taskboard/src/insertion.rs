//! Insertion resolution: pointer geometry and drop-target identification
//!
//! Pure functions only. Geometry decides whether a hovered card splits
//! above or below; id resolution maps whatever droppable the interaction
//! layer reports into a typed target, rejecting anything unknown.

use crate::error::{BoardError, Result};
use crate::store::TaskStore;
use crate::types::{TaskId, TaskStatus};

/// Suffix that marks a column's edge drop zone id
pub const GUTTER_SUFFIX: &str = ":gutter";

/// Vertical extent of a hovered card, as reported by the interaction layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub top: f64,
    pub height: f64,
}

impl RowBounds {
    /// Create bounds from a top edge and height
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Vertical midpoint of the card
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Which side of the hovered card a drop would land on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPosition {
    Above,
    Below,
}

/// Split a hovered card at its vertical midpoint: strictly above the
/// midpoint resolves `Above`, everything else `Below`.
pub fn resolve_hover_position(pointer_y: f64, bounds: RowBounds) -> HoverPosition {
    if pointer_y < bounds.midpoint() {
        HoverPosition::Above
    } else {
        HoverPosition::Below
    }
}

/// A drop id resolved against the known tasks and columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another card; the final slot comes from the insertion indicator
    Task(TaskId),
    /// A column body; resolves to append-at-end
    Column(TaskStatus),
    /// A column's edge zone; resolves to append-at-end
    Gutter(TaskStatus),
}

/// Resolve the id under the pointer at drop time.
///
/// Ids are tried as a task first, then as a gutter, then as a column.
/// Anything else is rejected so a stray droppable can never move a task.
pub fn resolve_drop_target(over_id: &str, store: &TaskStore) -> Result<DropTarget> {
    let as_task = TaskId::from_string(over_id);
    if let Some(task) = store.get(&as_task) {
        return Ok(DropTarget::Task(task.id.clone()));
    }

    if let Some(column) = over_id.strip_suffix(GUTTER_SUFFIX) {
        return match column.parse::<TaskStatus>() {
            Ok(status) => Ok(DropTarget::Gutter(status)),
            Err(_) => Err(BoardError::invalid_drop_target(over_id)),
        };
    }

    match over_id.parse::<TaskStatus>() {
        Ok(status) => Ok(DropTarget::Column(status)),
        Err(_) => Err(BoardError::invalid_drop_target(over_id)),
    }
}
