//! PersistenceCoordinator - background status persistence with rollback
//!
//! The board applies a move before the backend hears about it; this module
//! owns the confirmation traffic. Each submission is keyed by task id and a
//! generation counter so a failure can only roll back the state it actually
//! produced. A failure arriving after a newer move for the same task is
//! discarded rather than clobbering the newer optimistic state.

use crate::events::BoardEvent;
use crate::store::{lock_store, SharedStore};
use crate::types::{ReportRunId, StatusSnapshot, TaskId, TaskStatus};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Failure of the outbound status-update call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend refused the change
    #[error("status update rejected: {message}")]
    Rejected { message: String },

    /// The call never reached the backend
    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl GatewayError {
    /// Create a rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// The sole outbound call the board makes.
///
/// Implementations wrap whatever HTTP client the host application uses.
/// Success and failure must be distinguishable; the coordinator rolls the
/// optimistic state back on failure.
#[async_trait]
pub trait StatusGateway: Send + Sync {
    async fn update_task_status(
        &self,
        report_run_id: &ReportRunId,
        task_id: &TaskId,
        new_status: TaskStatus,
    ) -> Result<(), GatewayError>;
}

/// Issues asynchronous status updates and reconciles them against the
/// optimistic store state
pub struct PersistenceCoordinator {
    gateway: Arc<dyn StatusGateway>,
    report_run_id: ReportRunId,
    store: SharedStore,
    events: UnboundedSender<BoardEvent>,
    /// Latest generation issued per task; a completion only acts if its
    /// own generation is still the one recorded here
    in_flight: Arc<DashMap<TaskId, u64>>,
    generations: AtomicU64,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl PersistenceCoordinator {
    /// Create a coordinator for one report run
    pub fn new(
        gateway: Arc<dyn StatusGateway>,
        report_run_id: ReportRunId,
        store: SharedStore,
        events: UnboundedSender<BoardEvent>,
    ) -> Self {
        Self {
            gateway,
            report_run_id,
            store,
            events,
            in_flight: Arc::new(DashMap::new()),
            generations: AtomicU64::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// The report run this coordinator persists against
    pub fn report_run_id(&self) -> &ReportRunId {
        &self.report_run_id
    }

    /// Number of tasks with an unresolved status update
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget every in-flight request. Used when the server becomes
    /// authoritative again (an explicit refresh); late completions for the
    /// forgotten requests become no-ops.
    pub fn abandon_all(&self) {
        self.in_flight.clear();
    }

    /// Fire the status update for an already-applied move. Returns
    /// immediately; the interaction is never held up on the network.
    ///
    /// `previous` must be captured from the task before the optimistic
    /// apply. It is owned by this one request, so concurrent submissions
    /// for other tasks can never see each other's rollback values.
    pub fn submit_status_change(
        &self,
        task_id: TaskId,
        previous: StatusSnapshot,
        attempted: TaskStatus,
    ) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.in_flight.insert(task_id.clone(), generation);
        tracing::debug!(
            task = %task_id,
            from = %previous.status,
            to = %attempted,
            generation,
            "submitting status change"
        );

        let gateway = Arc::clone(&self.gateway);
        let report_run_id = self.report_run_id.clone();
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let handle = tokio::spawn(async move {
            let result = gateway
                .update_task_status(&report_run_id, &task_id, attempted)
                .await;

            // Claim the in-flight entry only if this request is still the
            // task's newest; otherwise a later submission owns the state.
            let is_latest = in_flight
                .remove_if(&task_id, |_, current| *current == generation)
                .is_some();

            match result {
                Ok(()) => {
                    if is_latest {
                        let _ = events.send(BoardEvent::StatusPersisted {
                            task_id,
                            status: attempted,
                        });
                    } else {
                        tracing::debug!(task = %task_id, generation, "stale confirmation dropped");
                    }
                }
                Err(err) if is_latest => {
                    let reverted = {
                        let mut store = lock_store(&store);
                        let still_attempted =
                            store.get(&task_id).map(|t| t.status) == Some(attempted);
                        still_attempted && store.revert_status(&task_id, &previous)
                    };
                    if reverted {
                        tracing::warn!(
                            task = %task_id,
                            attempted = %attempted,
                            reverted_to = %previous.status,
                            %err,
                            "status update failed, optimistic state reverted"
                        );
                        let _ = events.send(BoardEvent::StatusRejected {
                            task_id,
                            attempted,
                            reverted_to: previous.status,
                            message: err.to_string(),
                        });
                    } else {
                        tracing::warn!(
                            task = %task_id,
                            %err,
                            "status update failed but the task no longer holds the attempted status"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        task = %task_id,
                        generation,
                        %err,
                        "stale failure discarded, a newer move supersedes it"
                    );
                }
            }
        });

        self.pending
            .lock()
            .expect("pending persistence set poisoned")
            .push(handle);
    }

    /// Wait for every submitted request to resolve. Rendering never calls
    /// this; it exists for shutdown and for deterministic tests.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self
                .pending
                .lock()
                .expect("pending persistence set poisoned");
            pending.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::test_support::ScriptedGateway;
    use crate::types::Task;
    use tokio::sync::mpsc;

    struct Rig {
        store: SharedStore,
        gateway: Arc<ScriptedGateway>,
        coordinator: PersistenceCoordinator,
        events: mpsc::UnboundedReceiver<BoardEvent>,
    }

    fn rig(tasks: Vec<Task>) -> Rig {
        let store: SharedStore = Arc::new(std::sync::Mutex::new(TaskStore::from_tasks(tasks)));
        let gateway = Arc::new(ScriptedGateway::new());
        let (sender, events) = mpsc::unbounded_channel();
        let coordinator = PersistenceCoordinator::new(
            Arc::clone(&gateway) as Arc<dyn StatusGateway>,
            ReportRunId::from_string("run-1"),
            Arc::clone(&store),
            sender,
        );
        Rig {
            store,
            gateway,
            coordinator,
            events,
        }
    }

    fn optimistic_move(store: &SharedStore, id: &TaskId, to: TaskStatus) -> StatusSnapshot {
        let mut store = lock_store(store);
        let previous = store.get(id).unwrap().status_snapshot();
        let next = store.move_task(id, to, usize::MAX).unwrap();
        store.apply(next);
        previous
    }

    #[tokio::test]
    async fn test_success_clears_in_flight_and_emits() {
        let task = Task::new("A", TaskStatus::NotStarted);
        let id = task.id.clone();
        let mut rig = rig(vec![task]);

        let previous = optimistic_move(&rig.store, &id, TaskStatus::InProgress);
        rig.coordinator
            .submit_status_change(id.clone(), previous, TaskStatus::InProgress);
        assert_eq!(rig.coordinator.in_flight_count(), 1);

        rig.coordinator.flush().await;

        assert_eq!(rig.coordinator.in_flight_count(), 0);
        assert_eq!(rig.gateway.calls(), vec![(id.clone(), TaskStatus::InProgress)]);
        assert_eq!(
            rig.events.try_recv().unwrap(),
            BoardEvent::StatusPersisted {
                task_id: id.clone(),
                status: TaskStatus::InProgress,
            }
        );
        // The optimistic state stands
        assert_eq!(
            lock_store(&rig.store).get(&id).unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_failure_reverts_status_but_not_position() {
        let a = Task::new("A", TaskStatus::NotStarted);
        let b = Task::new("B", TaskStatus::NotStarted);
        let c = Task::new("C", TaskStatus::InProgress);
        let a_id = a.id.clone();
        let mut rig = rig(vec![a, b, c]);

        rig.gateway.push_err(GatewayError::rejected("run is locked"));

        let previous = optimistic_move(&rig.store, &a_id, TaskStatus::InProgress);
        rig.coordinator
            .submit_status_change(a_id.clone(), previous, TaskStatus::InProgress);
        rig.coordinator.flush().await;

        let store = lock_store(&rig.store);
        let reverted = store.get(&a_id).unwrap();
        assert_eq!(reverted.status, TaskStatus::NotStarted);
        assert!(reverted.completed_at.is_none());
        // Position is local-only: the card keeps the slot the move gave it
        assert_eq!(store.tasks().last().unwrap().id, a_id);
        drop(store);

        let event = rig.events.try_recv().unwrap();
        assert_eq!(
            event,
            BoardEvent::StatusRejected {
                task_id: a_id,
                attempted: TaskStatus::InProgress,
                reverted_to: TaskStatus::NotStarted,
                message: "status update rejected: run is locked".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_failure_only_touches_its_own_task() {
        let a = Task::new("A", TaskStatus::NotStarted);
        let b = Task::new("B", TaskStatus::NotStarted);
        let a_id = a.id.clone();
        let b_id = b.id.clone();
        let mut rig = rig(vec![a, b]);

        // A's call fails, B's succeeds, completing out of submission order
        let release_a = rig.gateway.push_hold();
        let release_b = rig.gateway.push_hold();

        let prev_a = optimistic_move(&rig.store, &a_id, TaskStatus::InProgress);
        rig.coordinator
            .submit_status_change(a_id.clone(), prev_a, TaskStatus::InProgress);
        let prev_b = optimistic_move(&rig.store, &b_id, TaskStatus::Completed);
        rig.coordinator
            .submit_status_change(b_id.clone(), prev_b, TaskStatus::Completed);

        release_b.send(Ok(())).unwrap();
        release_a
            .send(Err(GatewayError::transport("connection reset")))
            .unwrap();
        rig.coordinator.flush().await;

        let store = lock_store(&rig.store);
        assert_eq!(store.get(&a_id).unwrap().status, TaskStatus::NotStarted);
        assert_eq!(store.get(&b_id).unwrap().status, TaskStatus::Completed);
        drop(store);

        let mut events = Vec::new();
        while let Ok(event) = rig.events.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&BoardEvent::StatusPersisted {
            task_id: b_id,
            status: TaskStatus::Completed,
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            BoardEvent::StatusRejected { task_id, .. } if *task_id == a_id
        )));
    }

    #[tokio::test]
    async fn test_stale_failure_cannot_roll_back_newer_state() {
        let task = Task::new("A", TaskStatus::NotStarted);
        let id = task.id.clone();
        let mut rig = rig(vec![task]);

        let release_first = rig.gateway.push_hold();
        let release_second = rig.gateway.push_hold();

        // First move, still unresolved when the second one is submitted
        let prev1 = optimistic_move(&rig.store, &id, TaskStatus::InProgress);
        rig.coordinator
            .submit_status_change(id.clone(), prev1, TaskStatus::InProgress);
        let prev2 = optimistic_move(&rig.store, &id, TaskStatus::Completed);
        rig.coordinator
            .submit_status_change(id.clone(), prev2, TaskStatus::Completed);

        // The older call fails after the newer one succeeded
        release_second.send(Ok(())).unwrap();
        release_first
            .send(Err(GatewayError::rejected("conflict")))
            .unwrap();
        rig.coordinator.flush().await;

        // The newer optimistic state survives the stale failure
        assert_eq!(
            lock_store(&rig.store).get(&id).unwrap().status,
            TaskStatus::Completed
        );
        assert_eq!(rig.coordinator.in_flight_count(), 0);

        let mut events = Vec::new();
        while let Ok(event) = rig.events.try_recv() {
            events.push(event);
        }
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, BoardEvent::StatusRejected { .. })),
            "stale failure must not surface a rollback"
        );
    }

    #[tokio::test]
    async fn test_abandon_all_defuses_late_failures() {
        let task = Task::new("A", TaskStatus::NotStarted);
        let id = task.id.clone();
        let mut rig = rig(vec![task]);

        let release = rig.gateway.push_hold();
        let previous = optimistic_move(&rig.store, &id, TaskStatus::InProgress);
        rig.coordinator
            .submit_status_change(id.clone(), previous, TaskStatus::InProgress);

        // Server refresh arrives while the call is outstanding
        rig.coordinator.abandon_all();
        assert_eq!(rig.coordinator.in_flight_count(), 0);

        release
            .send(Err(GatewayError::transport("timed out")))
            .unwrap();
        rig.coordinator.flush().await;

        // No rollback, no surfaced failure
        assert_eq!(
            lock_store(&rig.store).get(&id).unwrap().status,
            TaskStatus::InProgress
        );
        assert!(rig.events.try_recv().is_err());
    }
}
