//! The task contract
//!
//! A task is one schedulable unit of background work. Its constraint queries
//! must be pure: the resolver evaluates them fresh on every insertion.

use crate::kind::{KindSet, TaskKind};
use crate::status::{ItemTally, ProgressReporter, TaskHandle, TaskStatus};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

/// Result of merging a new task with one already queued
pub enum Merge {
    /// Nothing in common, keep the new task as is
    Unchanged,
    /// Continue with this narrowed or widened task instead
    Replace(Box<dyn Task>),
    /// Everything the new task would do is already queued
    Redundant,
}

impl fmt::Debug for Merge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Merge::Unchanged => write!(f, "Unchanged"),
            Merge::Replace(task) => write!(f, "Replace({})", task.describe()),
            Merge::Redundant => write!(f, "Redundant"),
        }
    }
}

/// One schedulable operation
#[async_trait]
pub trait Task: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Kinds that must not run before this task
    fn invalid_before(&self) -> KindSet {
        self.kind().invalid_before()
    }

    /// Kinds that must not run after this task
    fn invalid_after(&self) -> KindSet {
        self.kind().invalid_after()
    }

    /// Kinds that must not share a stage with this task
    fn invalid_during(&self) -> KindSet {
        self.kind().invalid_during()
    }

    /// Work items (file paths) covered by this task
    fn items(&self) -> &[PathBuf];

    /// Whether the task covers the whole library rather than `items`
    fn whole_library(&self) -> bool {
        false
    }

    /// Whether `other`, still pending, becomes obsolete once this task is queued
    fn supersedes(&self, _other: &dyn Task) -> bool {
        false
    }

    /// Merge this (new) task against `other` (already queued)
    ///
    /// Must not mutate either task. Calling it twice with the same `other`
    /// gives the same answer.
    fn try_merge(&self, _other: &dyn Task) -> Merge {
        Merge::Unchanged
    }

    /// Short human readable description for logs
    fn describe(&self) -> String {
        format!("{} ({} items)", self.kind(), self.items().len())
    }

    /// Run the task body
    ///
    /// Per-item failures are recorded in the outcome; nothing escapes.
    async fn execute(&self, ctx: &TaskContext) -> TaskOutcome;
}

/// Execution context handed to `Task::execute`
pub struct TaskContext {
    id: u64,
    reporter: ProgressReporter,
}

impl TaskContext {
    pub(crate) fn new(id: u64, reporter: ProgressReporter) -> Self {
        Self { id, reporter }
    }

    /// Context for running a task outside of a queue
    pub fn detached(id: u64, kind: TaskKind) -> (Self, TaskHandle) {
        let (reporter, handle) = ProgressReporter::new(id, kind);
        reporter.start();
        (Self::new(id, reporter), handle)
    }

    /// Sequence id assigned by the queue
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.reporter.set_message(message.into());
    }

    /// Publish the counters so far out of `total` items
    pub fn report(&self, tally: ItemTally, total: usize) {
        self.reporter.set_progress(tally, total);
    }
}

/// What a task body produced
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub status: TaskStatus,
    pub message: Option<String>,
    pub error: Option<String>,
    pub tally: ItemTally,
    /// Resulting paths, e.g. the files an import created
    pub items: Vec<PathBuf>,
}

impl TaskOutcome {
    /// Outcome of a task that worked through all of its items
    pub fn completed(tally: ItemTally, items: Vec<PathBuf>) -> Self {
        Self {
            status: tally.status(false),
            message: None,
            error: None,
            tally,
            items,
        }
    }

    /// Outcome of a task that stopped early because of a task-fatal error
    pub fn aborted(tally: ItemTally, items: Vec<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            status: tally.status(true),
            message: None,
            error: Some(reason.into()),
            tally,
            items,
        }
    }

    /// Outcome of a task that could not run at all
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            message: None,
            error: Some(error.into()),
            tally: ItemTally::default(),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the first per-item error if nothing else is set
    #[must_use]
    pub fn with_first_error(mut self, error: Option<String>) -> Self {
        if self.error.is_none() {
            self.error = error;
        }
        self
    }
}
