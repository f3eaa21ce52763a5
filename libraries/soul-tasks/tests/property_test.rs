//! Property-based tests for the conflict resolver
//!
//! Random submission sequences over the three task kinds must always leave
//! a stage list that respects ordering and exclusion constraints.


use proptest::prelude::*;
use soul_tasks::{resolve_conflicts, SortScope, Stage, Task, TaskFactory, TaskKind};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use test_helpers::{factory, MemoryLibrary, TableFingerprinter};

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Submission {
    Import(Vec<u8>),
    Identify(Vec<u8>),
    Sort(Option<Vec<u8>>),
}

fn arbitrary_files() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..8, 1..4)
}

fn arbitrary_submission() -> impl Strategy<Value = Submission> {
    prop_oneof![
        arbitrary_files().prop_map(Submission::Import),
        arbitrary_files().prop_map(Submission::Identify),
        proptest::option::of(arbitrary_files()).prop_map(Submission::Sort),
    ]
}

fn files(ids: &[u8], dir: &str) -> Vec<PathBuf> {
    ids.iter().map(|i| PathBuf::from(format!("{dir}/{i}.mp3"))).collect()
}

fn build(factory: &TaskFactory, submission: &Submission) -> Box<dyn Task> {
    match submission {
        Submission::Import(ids) => Box::new(factory.import(files(ids, "/in"))),
        Submission::Identify(ids) => Box::new(factory.identify(files(ids, "/music"))),
        Submission::Sort(None) => Box::new(factory.sort(SortScope::Library)),
        Submission::Sort(Some(ids)) => {
            Box::new(factory.sort(SortScope::songs(files(ids, "/music"))))
        }
    }
}

fn fill(submissions: &[Submission]) -> Vec<Stage<Box<dyn Task>>> {
    let library = MemoryLibrary::new();
    let factory = factory(&library, Arc::new(TableFingerprinter::default()));
    let mut stages = Vec::new();
    for submission in submissions {
        resolve_conflicts(&mut stages, build(&factory, submission), |t| t)
            .expect("consistent queue never rejects a task");
    }
    stages
}

fn indexed(stages: &[Stage<Box<dyn Task>>]) -> Vec<(usize, &dyn Task)> {
    stages
        .iter()
        .enumerate()
        .flat_map(|(i, s)| s.tasks().iter().map(move |t| (i, t.as_ref())))
        .collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: a task never lands in a stage before one of the kinds it must follow
    #[test]
    fn stage_order_preserved(submissions in prop::collection::vec(arbitrary_submission(), 1..25)) {
        let stages = fill(&submissions);
        let tasks = indexed(&stages);

        for (i, a) in &tasks {
            for (j, b) in &tasks {
                if b.invalid_before().contains(a.kind()) {
                    prop_assert!(i < j, "{} in stage {} must precede {} in stage {}", a.describe(), i, b.describe(), j);
                }
            }
        }
    }

    /// Property: no stage holds two tasks that exclude each other
    #[test]
    fn exclusion_preserved(submissions in prop::collection::vec(arbitrary_submission(), 1..25)) {
        let stages = fill(&submissions);

        for stage in &stages {
            for (x, a) in stage.tasks().iter().enumerate() {
                for (y, b) in stage.tasks().iter().enumerate() {
                    if x != y {
                        prop_assert!(!a.invalid_during().contains(b.kind()));
                    }
                }
            }
        }
    }

    /// Property: compaction leaves no empty stage and at most one sort survives
    #[test]
    fn compact_and_single_sort(submissions in prop::collection::vec(arbitrary_submission(), 1..25)) {
        let stages = fill(&submissions);

        prop_assert!(stages.iter().all(|s| !s.is_empty()));
        let sorts = indexed(&stages)
            .iter()
            .filter(|(_, t)| t.kind() == TaskKind::Sort)
            .count();
        let submitted_sorts = submissions
            .iter()
            .filter(|s| matches!(s, Submission::Sort(_)))
            .count();
        prop_assert_eq!(sorts, usize::from(submitted_sorts > 0));
    }

    /// Property: queued identify tasks never share a song
    #[test]
    fn identify_sets_disjoint(submissions in prop::collection::vec(arbitrary_submission(), 1..25)) {
        let stages = fill(&submissions);

        let mut seen = BTreeSet::new();
        for (_, task) in indexed(&stages) {
            if task.kind() == TaskKind::Identify {
                for song in task.items() {
                    prop_assert!(seen.insert(song.clone()), "{} queued twice", song.display());
                }
            }
        }

        let requested: BTreeSet<PathBuf> = submissions
            .iter()
            .filter_map(|s| match s {
                Submission::Identify(ids) => Some(files(ids, "/music")),
                _ => None,
            })
            .flatten()
            .collect();
        prop_assert_eq!(seen, requested);
    }
}
