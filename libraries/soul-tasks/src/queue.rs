//! Stage-by-stage task scheduler
//!
//! `Queue::add` places tasks with the conflict resolver under a single mutex
//! and is safe to call from any thread, including threads outside the tokio
//! runtime. The execution loop pops the first stage, runs its tasks
//! concurrently and only advances once every one of them has finished.

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::kind::TaskKind;
use crate::resolver::{resolve_conflicts, Placement};
use crate::stage::{Scheduled, Stage};
use crate::status::{ItemTally, ProgressReporter, TaskHandle, TaskSnapshot, TaskStatus};
use crate::task::{Task, TaskContext, TaskOutcome};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::{broadcast, watch, Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Final report of a task, published exactly once per submitted task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub id: u64,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub message: Option<String>,
    pub error: Option<String>,
    pub tally: ItemTally,
    /// Paths the task produced (imported files for an import)
    pub items: Vec<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

impl TaskReport {
    fn new(snapshot: TaskSnapshot, items: Vec<PathBuf>) -> Self {
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            status: snapshot.status,
            message: snapshot.message,
            error: snapshot.error,
            tally: snapshot.tally,
            items,
            finished_at: Utc::now(),
        }
    }
}

/// Queue notifications
#[derive(Debug, Clone)]
pub enum QueueEvent {
    TaskQueued {
        id: u64,
        kind: TaskKind,
        placement: Placement,
    },
    StageStarted {
        tasks: Vec<u64>,
    },
    TaskStarted {
        id: u64,
        kind: TaskKind,
    },
    /// The "done" notification
    TaskFinished(TaskReport),
}

/// A queued task as seen from outside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedView {
    pub id: u64,
    pub kind: TaskKind,
    pub description: String,
}

/// A pending stage as seen from outside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub tasks: Vec<QueuedView>,
}

impl StageView {
    pub fn kinds(&self) -> Vec<TaskKind> {
        self.tasks.iter().map(|t| t.kind).collect()
    }
}

#[derive(Clone)]
struct QueuedTask {
    id: u64,
    task: Arc<dyn Task>,
    reporter: ProgressReporter,
}

impl Scheduled for QueuedTask {
    fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }
}

struct QueueState {
    stages: Vec<Stage<QueuedTask>>,
    /// Ids of the running stage's tasks that have not finished yet
    running: Vec<u64>,
    next_id: u64,
    shut_down: bool,
}

type FinishHook = Arc<dyn Fn(&TaskReport) + Send + Sync>;

/// Background task queue
pub struct Queue {
    state: Mutex<QueueState>,
    wakeup: Notify,
    idle: watch::Sender<bool>,
    events: broadcast::Sender<QueueEvent>,
    limiter: Option<Arc<Semaphore>>,
    hooks: RwLock<Vec<FinishHook>>,
    runner: Mutex<Option<JoinHandle<()>>>,
}

impl Queue {
    /// Create the queue and spawn its execution loop
    ///
    /// Must be called from within a tokio runtime. Call `shutdown` to stop
    /// the loop.
    pub fn start(config: QueueConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (idle, _) = watch::channel(true);
        let limiter = (config.max_concurrent_tasks > 0)
            .then(|| Arc::new(Semaphore::new(config.max_concurrent_tasks)));

        let queue = Arc::new(Self {
            state: Mutex::new(QueueState {
                stages: Vec::new(),
                running: Vec::new(),
                next_id: 1,
                shut_down: false,
            }),
            wakeup: Notify::new(),
            idle,
            events,
            limiter,
            hooks: RwLock::new(Vec::new()),
            runner: Mutex::new(None),
        });

        let runner = tokio::spawn(Arc::clone(&queue).run());
        *queue.runner.lock().unwrap_or_else(PoisonError::into_inner) = Some(runner);

        info!(
            max_concurrent_tasks = config.max_concurrent_tasks,
            "Task queue started"
        );
        queue
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit a task
    ///
    /// Never blocks on running tasks; only the stage-list lock is taken.
    pub fn add(&self, task: Box<dyn Task>) -> Result<TaskHandle> {
        let kind = task.kind();
        let description = task.describe();

        let (handle, placement, retired) = {
            let mut guard = self.lock_state();
            let state = &mut *guard;
            if state.shut_down {
                return Err(QueueError::ShutDown);
            }

            let id = state.next_id;
            let (reporter, handle) = ProgressReporter::new(id, kind);
            let resolution = resolve_conflicts(&mut state.stages, task, |task| {
                QueuedTask {
                    id,
                    task: Arc::from(task),
                    reporter: reporter.clone(),
                }
            })?;
            state.next_id += 1;

            let mut retired = Vec::with_capacity(resolution.removed.len() + 1);
            for superseded in resolution.removed {
                debug!(
                    id = superseded.id,
                    by = id,
                    "Superseded {}",
                    superseded.task.describe()
                );
                superseded
                    .reporter
                    .retire(TaskStatus::Superseded, &format!("Superseded by task {id}"));
                retired.push(superseded.reporter.snapshot());
            }

            if resolution.placement == Placement::Absorbed {
                reporter.retire(TaskStatus::Superseded, "Work already queued");
                retired.push(reporter.snapshot());
            } else {
                self.idle.send_replace(false);
            }

            (handle, resolution.placement, retired)
        };

        info!(
            id = handle.id(),
            placement = ?placement,
            "Queued {}",
            description
        );
        let _ = self.events.send(QueueEvent::TaskQueued {
            id: handle.id(),
            kind,
            placement,
        });
        for snapshot in retired {
            self.publish(TaskReport::new(snapshot, Vec::new()));
        }
        self.wakeup.notify_one();

        Ok(handle)
    }

    /// Pending stages, first to run first
    pub fn snapshot(&self) -> Vec<StageView> {
        self.lock_state()
            .stages
            .iter()
            .map(|stage| StageView {
                tasks: stage
                    .tasks()
                    .iter()
                    .map(|t| QueuedView {
                        id: t.id,
                        kind: t.task.kind(),
                        description: t.task.describe(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Number of tasks waiting in pending stages
    pub fn pending_count(&self) -> usize {
        self.lock_state().stages.iter().map(Stage::len).sum()
    }

    /// Ids of the running stage's tasks that have not finished yet
    pub fn running(&self) -> Vec<u64> {
        self.lock_state().running.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Register a callback run for every finished task
    ///
    /// Hooks run before the queue can report idle, so tasks they submit are
    /// seen by `wait_idle`. They must not block.
    pub fn on_task_finished(&self, hook: impl Fn(&TaskReport) + Send + Sync + 'static) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
    }

    /// Resolve once no stage is pending or running
    pub async fn wait_idle(&self) {
        let mut idle = self.idle.subscribe();
        let _ = idle.wait_for(|idle| *idle).await;
    }

    /// Stop accepting tasks, cancel pending ones and wait for the running
    /// stage to finish
    pub async fn shutdown(&self) {
        let cancelled: Vec<TaskSnapshot> = {
            let mut state = self.lock_state();
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            state
                .stages
                .drain(..)
                .flat_map(Stage::into_tasks)
                .map(|queued| {
                    queued
                        .reporter
                        .retire(TaskStatus::Cancelled, "Queue shut down");
                    queued.reporter.snapshot()
                })
                .collect()
        };

        info!(cancelled = cancelled.len(), "Shutting down task queue");
        for snapshot in cancelled {
            self.publish(TaskReport::new(snapshot, Vec::new()));
        }
        self.wakeup.notify_one();

        let runner = self
            .runner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(runner) = runner {
            if let Err(e) = runner.await {
                error!("Task queue loop ended abnormally: {}", e);
            }
        }
        self.idle.send_replace(true);
    }

    async fn run(self: Arc<Self>) {
        loop {
            let next = {
                let mut state = self.lock_state();
                if state.shut_down {
                    state.running.clear();
                    break;
                }
                if state.stages.is_empty() {
                    state.running.clear();
                    self.idle.send_replace(true);
                    None
                } else {
                    let stage = state.stages.remove(0);
                    state.running = stage.tasks().iter().map(|t| t.id).collect();
                    Some(stage)
                }
            };

            match next {
                Some(stage) => self.run_stage(stage).await,
                None => self.wakeup.notified().await,
            }
        }
        info!("Task queue stopped");
    }

    async fn run_stage(&self, stage: Stage<QueuedTask>) {
        let tasks = stage.into_tasks();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        info!(tasks = ?ids, "Starting stage");
        let _ = self.events.send(QueueEvent::StageStarted { tasks: ids.clone() });

        let mut running = JoinSet::new();
        for queued in tasks {
            let limiter = self.limiter.clone();
            let events = self.events.clone();
            running.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };

                queued.reporter.start();
                let _ = events.send(QueueEvent::TaskStarted {
                    id: queued.id,
                    kind: queued.task.kind(),
                });
                debug!(id = queued.id, "Running {}", queued.task.describe());

                let ctx = TaskContext::new(queued.id, queued.reporter.clone());
                let task = Arc::clone(&queued.task);
                let outcome = match tokio::spawn(async move { task.execute(&ctx).await }).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(id = queued.id, "Task panicked: {}", e);
                        TaskOutcome::failed(format!("Task panicked: {e}"))
                    }
                };
                (queued, outcome)
            });
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok((queued, outcome)) => self.complete(&queued, outcome),
                Err(e) => error!("Stage runner failed: {}", e),
            }
        }
        info!(tasks = ?ids, "Stage finished");
    }

    fn complete(&self, queued: &QueuedTask, outcome: TaskOutcome) {
        self.lock_state().running.retain(|&id| id != queued.id);
        queued.reporter.finish(&outcome);
        let snapshot = queued.reporter.snapshot();

        match snapshot.status {
            TaskStatus::Failed => warn!(
                id = queued.id,
                error = snapshot.error.as_deref().unwrap_or("unknown"),
                "Task failed: {}",
                queued.task.describe()
            ),
            status => info!(
                id = queued.id,
                ?status,
                succeeded = snapshot.tally.succeeded,
                skipped = snapshot.tally.skipped,
                failed = snapshot.tally.failed,
                "Task finished: {}",
                queued.task.describe()
            ),
        }

        self.publish(TaskReport::new(snapshot, outcome.items));
    }

    fn publish(&self, report: TaskReport) {
        // Hooks may submit tasks, which publishes again
        let hooks = self
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for hook in &hooks {
            hook(&report);
        }
        let _ = self.events.send(QueueEvent::TaskFinished(report));
    }
}
