//! Task types: the card itself and its backend-authoritative field snapshot

use super::ids::TaskId;
use super::status::{Priority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task card on the visibility board
///
/// Field names follow the REST payload produced by the report pipeline
/// (camelCase keys, SCREAMING_SNAKE status values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    pub title: String,
    #[serde(default)]
    pub description: String,

    /// Free-form grouping label, e.g. "Content" or "Technical SEO"
    #[serde(default)]
    pub category: String,

    /// What the work is expected to improve, e.g. "+12% share of voice"
    #[serde(default)]
    pub impact_metric: String,

    pub priority: Priority,

    /// References to other tasks. Display-only, never validated here.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set exactly while the task sits in the terminal column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task with the given title and status
    pub fn new(title: impl Into<String>, status: TaskStatus) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            status,
            title: title.into(),
            description: String::new(),
            category: String::new(),
            impact_metric: String::new(),
            priority: Priority::Medium,
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: if status.is_terminal() { Some(now) } else { None },
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the impact metric
    pub fn with_impact_metric(mut self, impact_metric: impl Into<String>) -> Self {
        self.impact_metric = impact_metric.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the dependencies
    pub fn with_dependencies(mut self, dependencies: Vec<TaskId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Derived completion flag
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Capture the backend-authoritative fields for a later rollback
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            completed_at: self.completed_at,
            updated_at: self.updated_at,
        }
    }

    /// Relabel the task's status, stamping the derived timestamp fields.
    /// A same-status call leaves the task untouched.
    pub(crate) fn transition(&mut self, status: TaskStatus) {
        if self.status == status {
            return;
        }
        let now = Utc::now();
        if status.is_terminal() {
            self.completed_at = Some(now);
        } else if self.status.is_terminal() {
            self.completed_at = None;
        }
        self.status = status;
        self.updated_at = now;
    }
}

/// Backend-authoritative fields of a task, captured at submission time so a
/// failed persistence call can restore exactly what it speculatively changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
