//! Error types for the task queue

use crate::kind::TaskKind;
use soul_core::{LookupError, SoulError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while placing a task into the stage list
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The task must run after stage `lower - 1` but before stage `upper`
    ///
    /// Raised when ordering constraints contradict each other instead of
    /// silently mis-ordering the queue.
    #[error(
        "Cannot place {kind} task: must follow stage {} but precede stage {upper}",
        .lower.saturating_sub(1)
    )]
    Unsatisfiable {
        kind: TaskKind,
        lower: usize,
        upper: usize,
    },
}

/// Errors returned by `Queue` operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Scheduling error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Queue is shut down")]
    ShutDown,
}

/// Failure of one work item inside a task
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Library error: {0}")]
    Library(#[from] SoulError),

    #[error("Identification error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Already inside the library: {}", .0.display())]
    AlreadyInLibrary(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No free file name for {}", .0.display())]
    NoFreeName(PathBuf),
}
