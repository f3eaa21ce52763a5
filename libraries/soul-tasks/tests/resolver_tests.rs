//! Placement scenarios for the conflict resolver with the real task kinds


use soul_tasks::{resolve_conflicts, Placement, SortScope, Stage, Task, TaskKind};
use std::path::PathBuf;
use std::sync::Arc;
use test_helpers::{factory, MemoryLibrary, TableFingerprinter};

type Stages = Vec<Stage<Box<dyn Task>>>;

struct Fixture {
    factory: soul_tasks::TaskFactory,
}

impl Fixture {
    fn new() -> Self {
        let library = MemoryLibrary::new();
        Self {
            factory: factory(&library, Arc::new(TableFingerprinter::default())),
        }
    }

    fn import(&self, files: &[&str]) -> Box<dyn Task> {
        Box::new(self.factory.import(paths(files)))
    }

    fn identify(&self, files: &[&str]) -> Box<dyn Task> {
        Box::new(self.factory.identify(paths(files)))
    }

    fn sort(&self, files: &[&str]) -> Box<dyn Task> {
        Box::new(self.factory.sort(SortScope::songs(paths(files))))
    }
}

fn paths(files: &[&str]) -> Vec<PathBuf> {
    files.iter().map(PathBuf::from).collect()
}

fn add(stages: &mut Stages, task: Box<dyn Task>) -> Placement {
    resolve_conflicts(stages, task, |t| t)
        .expect("placement should succeed")
        .placement
}

fn kinds(stages: &Stages) -> Vec<Vec<TaskKind>> {
    stages
        .iter()
        .map(|s| s.tasks().iter().map(|t| t.kind()).collect())
        .collect()
}

#[test]
fn test_import_into_empty_queue() {
    let fx = Fixture::new();
    let mut stages = Stages::new();

    let placement = add(&mut stages, fx.import(&["/in/f1.mp3"]));

    assert_eq!(placement, Placement::NewStage(0));
    assert_eq!(kinds(&stages), vec![vec![TaskKind::Import]]);
    assert_eq!(stages[0].tasks()[0].items(), paths(&["/in/f1.mp3"]).as_slice());
}

#[test]
fn test_import_goes_before_existing_sort() {
    let fx = Fixture::new();
    let mut stages: Stages = vec![
        Stage::single(fx.sort(&["/music/s.mp3"])),
        Stage::new(vec![fx.identify(&["/music/a.mp3"]), fx.identify(&["/music/b.mp3"])]),
        Stage::new(vec![fx.identify(&["/music/c.mp3"]), fx.import(&["/in/f0.mp3"])]),
        Stage::default(),
    ];

    let placement = add(&mut stages, fx.import(&["/in/f2.mp3"]));

    assert_eq!(placement, Placement::NewStage(0));
    assert_eq!(
        kinds(&stages),
        vec![
            vec![TaskKind::Import],
            vec![TaskKind::Sort],
            vec![TaskKind::Identify, TaskKind::Identify],
            vec![TaskKind::Identify, TaskKind::Import],
        ]
    );
    assert_eq!(stages[0].tasks()[0].items(), paths(&["/in/f2.mp3"]).as_slice());
}

#[test]
fn test_import_joins_existing_import_stage() {
    let fx = Fixture::new();
    let mut stages: Stages = vec![
        Stage::single(fx.import(&["/in/f0.mp3"])),
        Stage::new(vec![fx.identify(&["/music/a.mp3"]), fx.identify(&["/music/b.mp3"])]),
    ];

    let placement = add(&mut stages, fx.import(&["/in/f3.mp3"]));

    assert_eq!(placement, Placement::Joined(0));
    assert_eq!(
        kinds(&stages),
        vec![
            vec![TaskKind::Import, TaskKind::Import],
            vec![TaskKind::Identify, TaskKind::Identify],
        ]
    );
}

#[test]
fn test_single_task_into_empty_queue_for_every_kind() {
    let fx = Fixture::new();
    for task in [
        fx.import(&["/in/a.mp3"]),
        fx.identify(&["/music/a.mp3"]),
        fx.sort(&["/music/a.mp3"]),
    ] {
        let kind = task.kind();
        let mut stages = Stages::new();
        add(&mut stages, task);
        assert_eq!(kinds(&stages), vec![vec![kind]]);
    }
}

#[test]
fn test_newest_sort_replaces_older_ones() {
    let fx = Fixture::new();
    let mut stages = Stages::new();
    add(&mut stages, fx.import(&["/in/a.mp3"]));
    add(&mut stages, fx.sort(&["/music/a.mp3"]));
    add(&mut stages, fx.identify(&["/music/b.mp3"]));

    let resolution =
        resolve_conflicts(&mut stages, fx.sort(&["/music/c.mp3"]), |t| t).unwrap();

    assert_eq!(resolution.removed.len(), 1);
    assert_eq!(
        kinds(&stages),
        vec![
            vec![TaskKind::Import],
            vec![TaskKind::Identify],
            vec![TaskKind::Sort],
        ]
    );
    // The survivor covers the superseded sort's songs as well
    assert_eq!(
        stages[2].tasks()[0].items(),
        paths(&["/music/a.mp3", "/music/c.mp3"]).as_slice()
    );
}

#[test]
fn test_library_sort_absorbs_song_sorts() {
    let fx = Fixture::new();
    let mut stages = Stages::new();
    add(&mut stages, fx.sort(&["/music/a.mp3"]));
    add(
        &mut stages,
        Box::new(fx.factory.sort(SortScope::Library)),
    );
    add(&mut stages, fx.sort(&["/music/b.mp3"]));

    assert_eq!(kinds(&stages), vec![vec![TaskKind::Sort]]);
    assert!(stages[0].tasks()[0].whole_library());
}

#[test]
fn test_identify_merge_yields_disjoint_sets() {
    let fx = Fixture::new();
    let mut stages = Stages::new();
    add(&mut stages, fx.identify(&["/music/A.mp3", "/music/B.mp3"]));

    let placement = add(&mut stages, fx.identify(&["/music/B.mp3", "/music/C.mp3"]));

    assert_eq!(placement, Placement::Joined(0));
    let sets: Vec<&[PathBuf]> = stages[0].tasks().iter().map(|t| t.items()).collect();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0], paths(&["/music/A.mp3", "/music/B.mp3"]).as_slice());
    assert_eq!(sets[1], paths(&["/music/C.mp3"]).as_slice());
}

#[test]
fn test_fully_covered_identify_is_absorbed() {
    let fx = Fixture::new();
    let mut stages = Stages::new();
    add(&mut stages, fx.identify(&["/music/A.mp3", "/music/B.mp3"]));

    let placement = add(&mut stages, fx.identify(&["/music/B.mp3"]));

    assert_eq!(placement, Placement::Absorbed);
    assert_eq!(kinds(&stages), vec![vec![TaskKind::Identify]]);
}

#[test]
fn test_partially_queued_import_is_narrowed() {
    let fx = Fixture::new();
    let mut stages = Stages::new();
    add(&mut stages, fx.import(&["/in/a.mp3"]));

    add(&mut stages, fx.import(&["/in/a.mp3", "/in/b.mp3"]));

    let sets: Vec<&[PathBuf]> = stages[0].tasks().iter().map(|t| t.items()).collect();
    assert_eq!(sets, vec![
        paths(&["/in/a.mp3"]).as_slice(),
        paths(&["/in/b.mp3"]).as_slice(),
    ]);
}

#[test]
fn test_contradictory_queue_is_rejected() {
    let fx = Fixture::new();
    let mut stages: Stages = vec![
        Stage::single(fx.sort(&["/music/s.mp3"])),
        Stage::single(fx.import(&["/in/f.mp3"])),
    ];

    let result = resolve_conflicts(&mut stages, fx.identify(&["/music/x.mp3"]), |t| t);

    assert!(result.is_err());
    assert_eq!(
        kinds(&stages),
        vec![vec![TaskKind::Sort], vec![TaskKind::Import]]
    );
}
