//! Observable task state
//!
//! Every submitted task gets a `watch` channel. The queue and the running task
//! write to it through a `ProgressReporter`; callers read it through the
//! `TaskHandle` returned by `Queue::add`.

use crate::kind::TaskKind;
use crate::task::TaskOutcome;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of a task
///
/// `Pending → Running → {Succeeded, SucceededWithWarnings, Failed}`.
/// `Superseded` and `Cancelled` are only reachable from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    SucceededWithWarnings,
    Failed,
    /// Removed or absorbed by a newer task before it started
    Superseded,
    /// Still pending when the queue shut down
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

/// Per-item counters of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ItemTally {
    /// Items that were looked at, whatever the result
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Aggregate the counters into a terminal status
    ///
    /// An aborted task always ends with warnings. Otherwise the task failed only
    /// if every processed item failed.
    pub fn status(&self, aborted: bool) -> TaskStatus {
        if aborted {
            TaskStatus::SucceededWithWarnings
        } else if self.failed == 0 {
            TaskStatus::Succeeded
        } else if self.failed == self.processed() {
            TaskStatus::Failed
        } else {
            TaskStatus::SucceededWithWarnings
        }
    }
}

/// Point-in-time view of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: u64,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub message: Option<String>,
    /// Fraction of items processed, in `[0, 1]`
    pub progress: f32,
    pub error: Option<String>,
    pub tally: ItemTally,
}

impl TaskSnapshot {
    fn pending(id: u64, kind: TaskKind) -> Self {
        Self {
            id,
            kind,
            status: TaskStatus::Pending,
            message: None,
            progress: 0.0,
            error: None,
            tally: ItemTally::default(),
        }
    }
}

/// Read side of a task's state
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    kind: TaskKind,
    state: watch::Receiver<TaskSnapshot>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.state.borrow().status
    }

    /// Wait until the task reaches a terminal state
    pub async fn wait(&self) -> TaskSnapshot {
        let mut state = self.state.clone();
        if let Ok(snapshot) = state.wait_for(|s| s.status.is_terminal()).await {
            return snapshot.clone();
        }
        // Reporter gone: the last value is final
        self.snapshot()
    }
}

/// Write side of a task's state
#[derive(Debug, Clone)]
pub(crate) struct ProgressReporter {
    state: Arc<watch::Sender<TaskSnapshot>>,
}

impl ProgressReporter {
    pub(crate) fn new(id: u64, kind: TaskKind) -> (Self, TaskHandle) {
        let (tx, rx) = watch::channel(TaskSnapshot::pending(id, kind));
        let handle = TaskHandle { id, kind, state: rx };
        (Self { state: Arc::new(tx) }, handle)
    }

    pub(crate) fn handle(&self) -> TaskHandle {
        let snapshot = self.state.borrow();
        TaskHandle {
            id: snapshot.id,
            kind: snapshot.kind,
            state: self.state.subscribe(),
        }
    }

    pub(crate) fn start(&self) {
        self.state.send_modify(|s| s.status = TaskStatus::Running);
    }

    pub(crate) fn set_message(&self, message: String) {
        self.state.send_modify(|s| s.message = Some(message));
    }

    pub(crate) fn set_progress(&self, tally: ItemTally, total: usize) {
        self.state.send_modify(|s| {
            s.tally = tally;
            s.progress = if total == 0 {
                1.0
            } else {
                (tally.processed() as f32 / total as f32).clamp(0.0, 1.0)
            };
        });
    }

    /// Write the terminal state of a task that ran
    pub(crate) fn finish(&self, outcome: &TaskOutcome) {
        self.state.send_modify(|s| {
            s.status = outcome.status;
            s.tally = outcome.tally;
            s.progress = 1.0;
            if outcome.message.is_some() {
                s.message.clone_from(&outcome.message);
            }
            s.error.clone_from(&outcome.error);
        });
    }

    /// Terminate a task that never ran
    pub(crate) fn retire(&self, status: TaskStatus, reason: &str) {
        self.state.send_modify(|s| {
            s.status = status;
            s.message = Some(reason.to_string());
        });
    }

    pub(crate) fn snapshot(&self) -> TaskSnapshot {
        self.state.borrow().clone()
    }
}
