//! DragSession - the ephemeral drag interaction state machine
//!
//! One session exists per interaction: created on drag-start, mutated on
//! drag-over, consumed on drag-end, discarded on drag-cancel. It is never
//! persisted and the persistence layer never reads it.

use crate::insertion::HoverPosition;
use crate::types::{TaskId, TaskStatus};

/// The transient above/below marker shown while hovering a card, used to
/// compute the final slot on drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionIndicator {
    pub target_task_id: TaskId,
    pub position: HoverPosition,
    /// Column the marker renders in (the hovered card's column)
    pub target_status: TaskStatus,
}

/// States of one drag interaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
    },
    DraggingWithIndicator {
        task_id: TaskId,
        indicator: InsertionIndicator,
    },
}

/// Tracks the card being moved and the computed insertion indicator
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Check if a drag is in progress
    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// The card being moved, if any
    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id }
            | DragState::DraggingWithIndicator { task_id, .. } => Some(task_id),
        }
    }

    /// The current insertion indicator, if one is computed
    pub fn indicator(&self) -> Option<&InsertionIndicator> {
        match &self.state {
            DragState::DraggingWithIndicator { indicator, .. } => Some(indicator),
            _ => None,
        }
    }

    /// Begin dragging a card. An unfinished previous interaction is
    /// replaced; the interaction layer can emit a new start without an
    /// intervening end when pointer capture is lost.
    pub fn start(&mut self, task_id: TaskId) {
        if self.is_dragging() {
            tracing::debug!(task = %task_id, "drag restarted over an unfinished session");
        }
        self.state = DragState::Dragging { task_id };
    }

    /// Set or clear the insertion indicator. Ignored unless a drag is
    /// active; hover events can race the end of an interaction.
    pub fn set_indicator(&mut self, indicator: Option<InsertionIndicator>) {
        let task_id = match &self.state {
            DragState::Idle => {
                tracing::debug!("indicator update ignored, no active drag");
                return;
            }
            DragState::Dragging { task_id }
            | DragState::DraggingWithIndicator { task_id, .. } => task_id.clone(),
        };

        self.state = match indicator {
            Some(indicator) => DragState::DraggingWithIndicator { task_id, indicator },
            None => DragState::Dragging { task_id },
        };
    }

    /// Clear the indicator while keeping the drag alive
    pub fn clear_indicator(&mut self) {
        self.set_indicator(None);
    }

    /// Consume the session on drop, returning the moved card and the last
    /// computed indicator
    pub fn finish(&mut self) -> Option<(TaskId, Option<InsertionIndicator>)> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging { task_id } => Some((task_id, None)),
            DragState::DraggingWithIndicator { task_id, indicator } => {
                Some((task_id, Some(indicator)))
            }
        }
    }

    /// Abandon the interaction without touching the board
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
