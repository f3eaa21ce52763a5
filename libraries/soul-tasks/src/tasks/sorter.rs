//! Sort: move songs to the folder layout the settings describe

use super::{free_path, note_error, TRANSFER_ATTEMPTS};
use crate::error::TaskError;
use crate::kind::TaskKind;
use crate::sort_path::target_path;
use crate::status::ItemTally;
use crate::task::{Merge, Task, TaskContext, TaskOutcome};
use async_trait::async_trait;
use soul_core::{Library, SettingsProvider, Song, SoulError, SortSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which songs a sort covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortScope {
    Library,
    Songs(Vec<PathBuf>),
}

impl SortScope {
    pub fn songs(paths: Vec<PathBuf>) -> Self {
        let mut paths = paths;
        paths.sort();
        paths.dedup();
        SortScope::Songs(paths)
    }

    /// Smallest scope covering both
    #[must_use]
    pub fn widen(&self, whole_library: bool, paths: &[PathBuf]) -> Self {
        match self {
            SortScope::Library => SortScope::Library,
            SortScope::Songs(_) if whole_library => SortScope::Library,
            SortScope::Songs(own) => SortScope::songs(own.iter().chain(paths).cloned().collect()),
        }
    }
}

enum Sorted {
    Moved(PathBuf),
    InPlace,
    Duplicate,
}

pub struct SortTask {
    scope: SortScope,
    library: Arc<dyn Library>,
    settings: SortSettings,
}

impl SortTask {
    /// Create a sort; the settings are read once, here
    pub fn new(
        library: Arc<dyn Library>,
        settings: &dyn SettingsProvider,
        scope: SortScope,
    ) -> Self {
        Self {
            scope,
            library,
            settings: settings.sort_settings(),
        }
    }

    pub fn scope(&self) -> &SortScope {
        &self.scope
    }

    pub fn settings(&self) -> &SortSettings {
        &self.settings
    }

    async fn songs(
        &self,
        tally: &mut ItemTally,
        first_error: &mut Option<String>,
    ) -> Result<Vec<Song>, SoulError> {
        let paths = match &self.scope {
            SortScope::Library => return self.library.all_songs().await,
            SortScope::Songs(paths) => paths,
        };

        let mut songs = Vec::with_capacity(paths.len());
        for path in paths {
            match self.library.read_song(path).await {
                Ok(song) => songs.push(song),
                Err(e) => {
                    let e = TaskError::from(e);
                    warn!("Cannot sort {}: {}", path.display(), e);
                    note_error(first_error, &e);
                    tally.failed += 1;
                }
            }
        }
        Ok(songs)
    }

    async fn sort_one(&self, song: &Song) -> Result<Sorted, TaskError> {
        let target = target_path(&self.settings, song);
        if song.path == target {
            return Ok(Sorted::InPlace);
        }

        if self.library.file_exists(&target).await {
            let existing = self.library.content_hash(&target).await?;
            let moving = self.library.content_hash(&song.path).await?;
            if existing == moving {
                debug!(
                    "{} duplicates {}, removing it",
                    song.path.display(),
                    target.display()
                );
                self.library.delete_song(&song.path).await?;
                return Ok(Sorted::Duplicate);
            }
        }

        let mut attempt = 1;
        loop {
            let destination = free_path(self.library.as_ref(), &target, Some(&song.path)).await?;
            if destination == song.path {
                return Ok(Sorted::InPlace);
            }
            match self.library.move_file(&song.path, &destination).await {
                Ok(()) => return Ok(Sorted::Moved(destination)),
                Err(SoulError::AlreadyExists(_)) if attempt < TRANSFER_ATTEMPTS => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl Task for SortTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Sort
    }

    fn items(&self) -> &[PathBuf] {
        match &self.scope {
            SortScope::Library => &[],
            SortScope::Songs(paths) => paths,
        }
    }

    fn whole_library(&self) -> bool {
        self.scope == SortScope::Library
    }

    fn supersedes(&self, other: &dyn Task) -> bool {
        other.kind() == TaskKind::Sort
    }

    fn try_merge(&self, other: &dyn Task) -> Merge {
        if other.kind() != TaskKind::Sort {
            return Merge::Unchanged;
        }
        let widened = self.scope.widen(other.whole_library(), other.items());
        if widened == self.scope {
            return Merge::Unchanged;
        }
        Merge::Replace(Box::new(Self {
            scope: widened,
            library: Arc::clone(&self.library),
            settings: self.settings.clone(),
        }))
    }

    fn describe(&self) -> String {
        match &self.scope {
            SortScope::Library => "sort library".to_string(),
            SortScope::Songs(paths) => format!("sort {} songs", paths.len()),
        }
    }

    async fn execute(&self, ctx: &TaskContext) -> TaskOutcome {
        let mut tally = ItemTally::default();
        let mut first_error = None;

        let songs = match self.songs(&mut tally, &mut first_error).await {
            Ok(songs) => songs,
            Err(e) => {
                warn!("Cannot list library songs: {}", e);
                return TaskOutcome::failed(format!("Cannot list library songs: {e}"));
            }
        };

        let total = songs.len() + tally.failed;
        let mut moved = Vec::new();
        ctx.set_message(format!("Sorting {total} songs"));
        ctx.report(tally, total);

        for song in &songs {
            match self.sort_one(song).await {
                Ok(Sorted::Moved(destination)) => {
                    debug!(
                        "Moved {} -> {}",
                        song.path.display(),
                        destination.display()
                    );
                    tally.succeeded += 1;
                    moved.push(destination);
                }
                Ok(Sorted::Duplicate) => tally.succeeded += 1,
                Ok(Sorted::InPlace) => tally.skipped += 1,
                Err(e) => {
                    warn!("Failed to sort {}: {}", song.path.display(), e);
                    note_error(&mut first_error, &e);
                    tally.failed += 1;
                }
            }
            ctx.report(tally, total);
        }

        info!(
            moved = moved.len(),
            in_place = tally.skipped,
            failed = tally.failed,
            "Sort finished"
        );
        TaskOutcome::completed(tally, moved)
            .with_first_error(first_error)
            .with_message(format!(
                "Sorted {} songs ({} already in place, {} failed)",
                tally.succeeded, tally.skipped, tally.failed
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_scope() {
        let own = SortScope::songs(vec![PathBuf::from("/b"), PathBuf::from("/a")]);
        assert_eq!(
            own.widen(false, &[PathBuf::from("/c"), PathBuf::from("/a")]),
            SortScope::Songs(vec!["/a".into(), "/b".into(), "/c".into()])
        );
        assert_eq!(own.widen(true, &[]), SortScope::Library);
        assert_eq!(SortScope::Library.widen(false, &[]), SortScope::Library);
    }
}
