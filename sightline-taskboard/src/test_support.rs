//! Test helpers shared by unit and integration tests
//!
//! Compiled for this crate's own tests, and for downstream test code via
//! the `test-support` feature.

use crate::persist::{GatewayError, StatusGateway};
use crate::types::{ReportRunId, TaskId, TaskStatus};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

enum Response {
    Ready(Result<(), GatewayError>),
    Hold(oneshot::Receiver<Result<(), GatewayError>>),
}

/// A gateway whose responses are scripted by the test.
///
/// Every call is recorded. Responses are consumed in call order from a
/// queue: a `Ready` entry resolves immediately, a `Hold` entry parks the
/// call on a oneshot so the test can resolve calls out of submission
/// order. An empty queue resolves to success.
#[derive(Default)]
pub struct ScriptedGateway {
    calls: Mutex<Vec<(TaskId, TaskStatus)>>,
    script: Mutex<VecDeque<Response>>,
}

impl ScriptedGateway {
    /// Create a gateway that succeeds unless told otherwise
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate success
    pub fn push_ok(&self) {
        self.push(Response::Ready(Ok(())));
    }

    /// Queue an immediate failure
    pub fn push_err(&self, err: GatewayError) {
        self.push(Response::Ready(Err(err)));
    }

    /// Queue a held response; the returned sender resolves it
    pub fn push_hold(&self) -> oneshot::Sender<Result<(), GatewayError>> {
        let (sender, receiver) = oneshot::channel();
        self.push(Response::Hold(receiver));
        sender
    }

    /// Every `(task, status)` pair the board sent, in call order
    pub fn calls(&self) -> Vec<(TaskId, TaskStatus)> {
        self.calls.lock().expect("calls poisoned").clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls poisoned").len()
    }

    fn push(&self, response: Response) {
        self.script
            .lock()
            .expect("script poisoned")
            .push_back(response);
    }
}

#[async_trait]
impl StatusGateway for ScriptedGateway {
    async fn update_task_status(
        &self,
        _report_run_id: &ReportRunId,
        task_id: &TaskId,
        new_status: TaskStatus,
    ) -> Result<(), GatewayError> {
        self.calls
            .lock()
            .expect("calls poisoned")
            .push((task_id.clone(), new_status));

        let next = self.script.lock().expect("script poisoned").pop_front();
        match next {
            None => Ok(()),
            Some(Response::Ready(result)) => result,
            Some(Response::Hold(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(GatewayError::transport("response channel dropped"))),
        }
    }
}
