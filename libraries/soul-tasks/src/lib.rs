//! Soul Library Task Queue
//!
//! Background scheduler for library maintenance work: importing files,
//! identifying songs and sorting the library on disk.
//!
//! # Features
//!
//! - Stage-based execution: tasks in one stage run concurrently, stages run
//!   strictly one after another
//! - Constraint-based placement: every task declares which kinds must run
//!   before it, after it, and never alongside it
//! - Deduplication: a new Sort supersedes queued ones, overlapping Identify and
//!   Import tasks are narrowed to their unique work
//! - Progress reporting per task through `TaskHandle`
//! - Thread-safe submission from any thread while a stage is running
//!
//! # Architecture
//!
//! - `kind`: Task kinds and constraint sets
//! - `task`: The `Task` contract, merge decisions and outcomes
//! - `status`: Observable task state (`TaskHandle`, `TaskSnapshot`)
//! - `stage`: Groups of mutually compatible tasks
//! - `resolver`: Placement of a new task into the stage list
//! - `queue`: The scheduler and its execution loop
//! - `tasks`: The Import, Identify and Sort task kinds
//! - `sort_path`: Target path computation for the sorter
//! - `factory` / `follow_up`: Wiring and import → identify → sort chaining

mod config;
mod error;

pub mod factory;
pub mod follow_up;
pub mod kind;
pub mod queue;
pub mod resolver;
pub mod sort_path;
pub mod stage;
pub mod status;
pub mod task;
pub mod tasks;

pub use config::{FollowUpPolicy, QueueConfig};
pub use error::{QueueError, ResolveError, TaskError};
pub use factory::TaskFactory;
pub use follow_up::FollowUps;
pub use kind::{KindSet, TaskKind};
pub use queue::{Queue, QueueEvent, QueuedView, StageView, TaskReport};
pub use resolver::{resolve_conflicts, Placement, Resolution};
pub use stage::{Scheduled, Stage};
pub use status::{ItemTally, TaskHandle, TaskSnapshot, TaskStatus};
pub use task::{Merge, Task, TaskContext, TaskOutcome};
pub use tasks::{IdentifyTask, ImportTask, SortScope, SortTask};

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
