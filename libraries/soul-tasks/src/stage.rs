//! Stages: groups of tasks that may run concurrently

use crate::task::Task;
use std::sync::Arc;

/// Anything that carries a task, so the resolver can work on bare tasks in
/// tests and on queue entries in the scheduler
pub trait Scheduled {
    fn task(&self) -> &dyn Task;
}

impl Scheduled for Box<dyn Task> {
    fn task(&self) -> &dyn Task {
        self.as_ref()
    }
}

impl Scheduled for Arc<dyn Task> {
    fn task(&self) -> &dyn Task {
        self.as_ref()
    }
}

/// Whether two tasks may share a stage, checked in both directions
pub fn compatible(a: &dyn Task, b: &dyn Task) -> bool {
    !a.invalid_during().contains(b.kind()) && !b.invalid_during().contains(a.kind())
}

/// Ordered group of mutually compatible tasks
#[derive(Debug, Clone)]
pub struct Stage<T> {
    tasks: Vec<T>,
}

impl<T> Default for Stage<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T: Scheduled> Stage<T> {
    pub fn new(tasks: Vec<T>) -> Self {
        Self { tasks }
    }

    pub fn single(task: T) -> Self {
        Self { tasks: vec![task] }
    }

    pub fn tasks(&self) -> &[T] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn push(&mut self, task: T) {
        self.tasks.push(task);
    }

    pub fn into_tasks(self) -> Vec<T> {
        self.tasks
    }

    /// Whether `task` could join this stage
    pub fn accepts(&self, task: &dyn Task) -> bool {
        self.tasks.iter().all(|t| compatible(t.task(), task))
    }

    /// Remove the tasks flagged in `mask`, returning them in order
    pub(crate) fn extract(&mut self, mask: &[bool]) -> Vec<T> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.tasks.len());
        for (i, task) in self.tasks.drain(..).enumerate() {
            if mask.get(i).copied().unwrap_or(false) {
                removed.push(task);
            } else {
                kept.push(task);
            }
        }
        self.tasks = kept;
        removed
    }
}
