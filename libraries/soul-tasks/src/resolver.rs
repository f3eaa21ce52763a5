//! Placement of new tasks into the stage list
//!
//! Given stages `S0..Sn`, a new task goes through:
//!
//! 1. Merge against every pending task
//! 2. Removal of every pending task it supersedes
//! 3. Bounds: after the last stage holding a task that must precede it, before
//!    the first stage holding a task that must follow it
//! 4. Placement into the last compatible stage inside the bounds, or a new
//!    stage at the lower bound
//! 5. Compaction of emptied stages
//!
//! Nothing is modified when the bounds contradict each other.

use crate::error::ResolveError;
use crate::stage::{compatible, Scheduled, Stage};
use crate::task::{Merge, Task};
use tracing::{debug, warn};

/// Where the new task ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Appended to the existing stage at this index
    Joined(usize),
    /// Inserted as a new stage at this index
    NewStage(usize),
    /// Its work was already queued, nothing inserted
    Absorbed,
}

impl Placement {
    pub fn stage(self) -> Option<usize> {
        match self {
            Placement::Joined(i) | Placement::NewStage(i) => Some(i),
            Placement::Absorbed => None,
        }
    }
}

/// Result of one resolution
#[derive(Debug)]
pub struct Resolution<T> {
    pub placement: Placement,
    /// Pending tasks removed because the new task supersedes them
    pub removed: Vec<T>,
}

/// `existing` must finish before `new` starts
fn must_precede(existing: &dyn Task, new: &dyn Task) -> bool {
    new.invalid_before().contains(existing.kind()) || existing.invalid_after().contains(new.kind())
}

/// `existing` must not start before `new` finished
fn must_follow(existing: &dyn Task, new: &dyn Task) -> bool {
    new.invalid_after().contains(existing.kind()) || existing.invalid_before().contains(new.kind())
}

fn survivors<'a, T: Scheduled>(
    stage: &'a Stage<T>,
    doomed: &'a [bool],
) -> impl Iterator<Item = &'a dyn Task> + 'a {
    stage
        .tasks()
        .iter()
        .zip(doomed)
        .filter(|(_, doomed)| !**doomed)
        .map(|(t, _)| t.task())
}

/// Place `new_task` into `stages`
///
/// `stages` holds only pending work; tasks that already started never take
/// part in merging or removal. `wrap` turns the (possibly merged) task into
/// the stage entry type once placement is certain.
pub fn resolve_conflicts<T: Scheduled>(
    stages: &mut Vec<Stage<T>>,
    new_task: Box<dyn Task>,
    wrap: impl FnOnce(Box<dyn Task>) -> T,
) -> Result<Resolution<T>, ResolveError> {
    let mut candidate = new_task;

    let pending = stages
        .iter()
        .flat_map(|s| s.tasks().iter().map(Scheduled::task));
    for other in pending {
        match candidate.try_merge(other) {
            Merge::Unchanged => {}
            Merge::Replace(merged) => {
                debug!(
                    from = %candidate.describe(),
                    to = %merged.describe(),
                    "Merged task with queued {}",
                    other.describe()
                );
                candidate = merged;
            }
            Merge::Redundant => {
                debug!(
                    task = %candidate.describe(),
                    "Task absorbed by queued {}",
                    other.describe()
                );
                return Ok(Resolution {
                    placement: Placement::Absorbed,
                    removed: Vec::new(),
                });
            }
        }
    }

    let doomed: Vec<Vec<bool>> = stages
        .iter()
        .map(|s| s.tasks().iter().map(|t| candidate.supersedes(t.task())).collect())
        .collect();

    let lower = stages
        .iter()
        .zip(&doomed)
        .rposition(|(s, d)| survivors(s, d).any(|t| must_precede(t, candidate.as_ref())))
        .map_or(0, |i| i + 1);
    let upper = stages
        .iter()
        .zip(&doomed)
        .position(|(s, d)| survivors(s, d).any(|t| must_follow(t, candidate.as_ref())))
        .unwrap_or(stages.len());

    if lower > upper {
        warn!(
            task = %candidate.describe(),
            lower,
            upper,
            "Contradictory ordering constraints"
        );
        return Err(ResolveError::Unsatisfiable {
            kind: candidate.kind(),
            lower,
            upper,
        });
    }

    let target = (lower..upper).rev().find(|&i| {
        let mut members = survivors(&stages[i], &doomed[i]).peekable();
        members.peek().is_some() && members.all(|t| compatible(t, candidate.as_ref()))
    });

    // Validation done, start mutating
    let mut removed = Vec::new();
    for (stage, mask) in stages.iter_mut().zip(&doomed) {
        removed.extend(stage.extract(mask));
    }

    let compacted_index = |stages: &[Stage<T>], i: usize| {
        stages[..i].iter().filter(|s| !s.is_empty()).count()
    };

    let placement = match target {
        Some(i) => {
            let index = compacted_index(&stages[..], i);
            stages.retain(|s| !s.is_empty());
            stages[index].push(wrap(candidate));
            Placement::Joined(index)
        }
        None => {
            let index = compacted_index(&stages[..], lower);
            stages.retain(|s| !s.is_empty());
            stages.insert(index, Stage::single(wrap(candidate)));
            Placement::NewStage(index)
        }
    };

    Ok(Resolution { placement, removed })
}
