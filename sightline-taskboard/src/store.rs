//! TaskStore - the canonical in-memory ordered task collection
//!
//! All tasks live in one ordered sequence; the status columns the board
//! renders are derived filter views over it. Keeping a single sequence means
//! the per-column orders can never diverge from each other.

use crate::error::{BoardError, Result};
use crate::types::{StatusSnapshot, Task, TaskId, TaskStatus};
use std::sync::{Arc, Mutex, MutexGuard};

/// Store handle shared between the page controller and the persistence layer
pub type SharedStore = Arc<Mutex<TaskStore>>;

/// Lock the shared store. Critical sections are short and never await, so
/// this only panics if a previous holder panicked mid-update.
pub(crate) fn lock_store(store: &SharedStore) -> MutexGuard<'_, TaskStore> {
    store.lock().expect("task store lock poisoned")
}

/// The ordered task collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

/// Immutable copy of the store, used for rollback
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    tasks: Vec<Task>,
}

impl StoreSnapshot {
    /// The captured sequence
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given sequence
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Number of tasks across all columns
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The full ordered sequence
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Find a task by id
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Check if a task exists
    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Derived column view: tasks with the given status, in sequence order
    pub fn bucket(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Number of tasks in a column
    pub fn bucket_len(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    /// A task's index within its own column
    pub fn index_in_bucket(&self, id: &TaskId) -> Option<usize> {
        let status = self.get(id)?.status;
        self.tasks
            .iter()
            .filter(|t| t.status == status)
            .position(|t| &t.id == id)
    }

    /// Take an immutable copy of the current sequence
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
        }
    }

    /// Atomically replace the sequence with a prior snapshot
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.tasks = snapshot.tasks;
    }

    /// Install a computed sequence (the optimistic-apply step)
    pub fn apply(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Replace everything with an authoritative task list from the server
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.apply(tasks);
    }

    /// Compute the sequence that results from moving a task to
    /// `destination` at `insertion_index` within that column.
    ///
    /// The task's old slot is removed before the new slot is computed, so a
    /// same-column move can never be off by one against itself. Tasks not
    /// involved in the move keep their relative order. The index clamps to
    /// an append. The current sequence is left untouched.
    pub fn move_task(
        &self,
        id: &TaskId,
        destination: TaskStatus,
        insertion_index: usize,
    ) -> Result<Vec<Task>> {
        let current = self
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| BoardError::task_not_found(id))?;

        let mut next = self.tasks.clone();
        let mut moved = next.remove(current);
        moved.transition(destination);

        // Sequence positions of the destination column's remaining members
        let slots: Vec<usize> = next
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == destination)
            .map(|(i, _)| i)
            .collect();

        let at = if slots.is_empty() {
            next.len()
        } else if insertion_index < slots.len() {
            slots[insertion_index]
        } else {
            slots[slots.len() - 1] + 1
        };

        next.insert(at, moved);
        Ok(next)
    }

    /// Roll a task's backend-authoritative fields back to a captured
    /// snapshot. Position is a local-only concept and stays where the
    /// optimistic move put it. Returns false if the task is gone.
    pub fn revert_status(&mut self, id: &TaskId, previous: &StatusSnapshot) -> bool {
        match self.tasks.iter_mut().find(|t| &t.id == id) {
            Some(task) => {
                task.status = previous.status;
                task.completed_at = previous.completed_at;
                task.updated_at = previous.updated_at;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> TaskStore {
        TaskStore::from_tasks(vec![
            Task::new("A", TaskStatus::NotStarted),
            Task::new("B", TaskStatus::NotStarted),
            Task::new("C", TaskStatus::InProgress),
            Task::new("D", TaskStatus::InProgress),
            Task::new("E", TaskStatus::Completed),
        ])
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    fn id_of(store: &TaskStore, title: &str) -> TaskId {
        store
            .tasks()
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.id.clone())
            .unwrap()
    }

    #[test]
    fn test_buckets_are_derived_views() {
        let store = seeded();
        assert_eq!(store.len(), 5);
        assert_eq!(store.bucket_len(TaskStatus::NotStarted), 2);
        assert_eq!(titles(&store.bucket(TaskStatus::InProgress)), ["C", "D"]);
        assert_eq!(store.index_in_bucket(&id_of(&store, "D")), Some(1));
    }

    #[test]
    fn test_move_within_bucket() {
        let store = seeded();
        let a = id_of(&store, "A");

        let next = store.move_task(&a, TaskStatus::NotStarted, 1).unwrap();
        let next = TaskStore::from_tasks(next);

        assert_eq!(titles(&next.bucket(TaskStatus::NotStarted)), ["B", "A"]);
        // Other columns untouched
        assert_eq!(titles(&next.bucket(TaskStatus::InProgress)), ["C", "D"]);
        // Same-column move does not restamp status fields
        assert_eq!(next.get(&a).unwrap().status, TaskStatus::NotStarted);
    }

    #[test]
    fn test_move_across_buckets_relabels_status() {
        let store = seeded();
        let a = id_of(&store, "A");

        let next = store.move_task(&a, TaskStatus::InProgress, 1).unwrap();
        let next = TaskStore::from_tasks(next);

        assert_eq!(titles(&next.bucket(TaskStatus::NotStarted)), ["B"]);
        assert_eq!(titles(&next.bucket(TaskStatus::InProgress)), ["C", "A", "D"]);
        assert_eq!(next.get(&a).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn test_move_to_terminal_stamps_completion() {
        let store = seeded();
        let c = id_of(&store, "C");

        let next = store.move_task(&c, TaskStatus::Completed, 0).unwrap();
        let next = TaskStore::from_tasks(next);

        let moved = next.get(&c).unwrap();
        assert!(moved.completed_at.is_some());
        assert_eq!(titles(&next.bucket(TaskStatus::Completed)), ["C", "E"]);
    }

    #[test]
    fn test_move_into_empty_bucket_appends() {
        let store = TaskStore::from_tasks(vec![
            Task::new("A", TaskStatus::NotStarted),
            Task::new("B", TaskStatus::NotStarted),
        ]);
        let a = id_of(&store, "A");

        let next = store.move_task(&a, TaskStatus::Completed, 0).unwrap();
        let next = TaskStore::from_tasks(next);

        assert_eq!(titles(&next.bucket(TaskStatus::NotStarted)), ["B"]);
        assert_eq!(titles(&next.bucket(TaskStatus::Completed)), ["A"]);
    }

    #[test]
    fn test_out_of_range_index_clamps_to_append() {
        let store = seeded();
        let a = id_of(&store, "A");

        let next = store.move_task(&a, TaskStatus::InProgress, 99).unwrap();
        let next = TaskStore::from_tasks(next);

        assert_eq!(titles(&next.bucket(TaskStatus::InProgress)), ["C", "D", "A"]);
    }

    #[test]
    fn test_move_unknown_task_fails() {
        let store = seeded();
        let ghost = TaskId::from_string("ghost");

        let result = store.move_task(&ghost, TaskStatus::Completed, 0);
        assert!(matches!(result, Err(BoardError::TaskNotFound { .. })));
    }

    #[test]
    fn test_move_preserves_cardinality() {
        let store = seeded();
        let d = id_of(&store, "D");

        let next = store.move_task(&d, TaskStatus::NotStarted, 0).unwrap();
        assert_eq!(next.len(), store.len());

        let mut before: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        let mut after: Vec<&str> = next.iter().map(|t| t.id.as_str()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut store = seeded();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.tasks().len(), store.len());
        let a = id_of(&store, "A");

        let next = store.move_task(&a, TaskStatus::Completed, 0).unwrap();
        store.apply(next);
        assert_eq!(store.bucket_len(TaskStatus::NotStarted), 1);

        store.restore(snapshot);
        assert_eq!(titles(&store.bucket(TaskStatus::NotStarted)), ["A", "B"]);
        assert_eq!(store.get(&a).unwrap().status, TaskStatus::NotStarted);
    }

    #[test]
    fn test_revert_status_keeps_position() {
        let mut store = seeded();
        let a = id_of(&store, "A");
        let previous = store.get(&a).unwrap().status_snapshot();

        let next = store.move_task(&a, TaskStatus::InProgress, 2).unwrap();
        store.apply(next);
        assert_eq!(titles(&store.bucket(TaskStatus::InProgress)), ["C", "D", "A"]);

        assert!(store.revert_status(&a, &previous));

        let reverted = store.get(&a).unwrap();
        assert_eq!(reverted.status, TaskStatus::NotStarted);
        assert!(reverted.completed_at.is_none());
        // The sequence slot is untouched; only the column label moved back,
        // so A now renders at the end of its old column.
        assert_eq!(titles(&store.bucket(TaskStatus::NotStarted)), ["B", "A"]);
        assert_eq!(titles(&store.bucket(TaskStatus::InProgress)), ["C", "D"]);
    }

    #[test]
    fn test_revert_status_on_missing_task() {
        let mut store = seeded();
        let a = id_of(&store, "A");
        let previous = store.get(&a).unwrap().status_snapshot();

        store.replace_all(Vec::new());
        assert!(!store.revert_status(&a, &previous));
    }
}
