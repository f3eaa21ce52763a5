//! Task kinds and the constraint sets built from them

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of schedulable task kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Import,
    Identify,
    Sort,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Import, TaskKind::Identify, TaskKind::Sort];

    const fn bit(self) -> u8 {
        match self {
            TaskKind::Import => 1,
            TaskKind::Identify => 1 << 1,
            TaskKind::Sort => 1 << 2,
        }
    }

    /// Kinds that must not be scheduled before a task of this kind
    ///
    /// A pending task of one of these kinds forces this kind into a later stage.
    pub const fn invalid_before(self) -> KindSet {
        match self {
            TaskKind::Import => KindSet::EMPTY,
            TaskKind::Identify => KindSet::of(&[TaskKind::Import]),
            TaskKind::Sort => KindSet::of(&[TaskKind::Import, TaskKind::Identify]),
        }
    }

    /// Kinds that must not be scheduled after a task of this kind
    pub const fn invalid_after(self) -> KindSet {
        match self {
            TaskKind::Import => KindSet::of(&[TaskKind::Identify, TaskKind::Sort]),
            TaskKind::Identify => KindSet::of(&[TaskKind::Sort]),
            TaskKind::Sort => KindSet::EMPTY,
        }
    }

    /// Kinds that must never share a stage with this kind
    pub const fn invalid_during(self) -> KindSet {
        match self {
            TaskKind::Import => KindSet::of(&[TaskKind::Identify, TaskKind::Sort]),
            TaskKind::Identify => KindSet::of(&[TaskKind::Import, TaskKind::Sort]),
            TaskKind::Sort => KindSet::of(&[TaskKind::Import, TaskKind::Identify, TaskKind::Sort]),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Import => write!(f, "import"),
            TaskKind::Identify => write!(f, "identify"),
            TaskKind::Sort => write!(f, "sort"),
        }
    }
}

/// Small copyable set of task kinds
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);

    pub const fn of(kinds: &[TaskKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        KindSet(bits)
    }

    pub const fn contains(self, kind: TaskKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub const fn with(self, kind: TaskKind) -> Self {
        KindSet(self.0 | kind.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = TaskKind> {
        TaskKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<TaskKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = TaskKind>>(iter: I) -> Self {
        iter.into_iter().fold(KindSet::EMPTY, KindSet::with)
    }
}

impl fmt::Debug for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
