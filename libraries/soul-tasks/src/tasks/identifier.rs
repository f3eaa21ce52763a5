//! Identify: look songs up and complete their tags

use super::note_error;
use crate::error::TaskError;
use crate::kind::TaskKind;
use crate::status::ItemTally;
use crate::task::{Merge, Task, TaskContext, TaskOutcome};
use async_trait::async_trait;
use soul_core::{Fingerprinter, Library, LookupError, MetadataProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Identified {
    Updated,
    Unchanged,
    NoMatch,
}

pub struct IdentifyTask {
    songs: Vec<PathBuf>,
    library: Arc<dyn Library>,
    fingerprinter: Arc<dyn Fingerprinter>,
    provider: Arc<dyn MetadataProvider>,
    overwrite: bool,
}

impl IdentifyTask {
    pub fn new(
        library: Arc<dyn Library>,
        fingerprinter: Arc<dyn Fingerprinter>,
        provider: Arc<dyn MetadataProvider>,
        songs: Vec<PathBuf>,
    ) -> Self {
        let mut songs = songs;
        songs.sort();
        songs.dedup();
        Self {
            songs,
            library,
            fingerprinter,
            provider,
            overwrite: false,
        }
    }

    /// Replace existing tags instead of only filling missing ones
    #[must_use]
    pub fn overwriting(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn songs(&self) -> &[PathBuf] {
        &self.songs
    }

    fn narrowed(&self, songs: Vec<PathBuf>) -> Self {
        Self {
            songs,
            library: Arc::clone(&self.library),
            fingerprinter: Arc::clone(&self.fingerprinter),
            provider: Arc::clone(&self.provider),
            overwrite: self.overwrite,
        }
    }

    async fn identify_one(&self, path: &Path) -> Result<Identified, TaskError> {
        let mut song = self.library.read_song(path).await?;

        let partial = match self.fingerprinter.identify(path).await {
            Ok(partial) => partial,
            Err(LookupError::NoMatch) => return Ok(Identified::NoMatch),
            Err(e) => return Err(e.into()),
        };
        let found = match self.provider.enrich(&song, &partial).await {
            Ok(found) => found,
            // The fingerprint match alone is still worth keeping
            Err(LookupError::NoMatch) => partial,
            Err(e) => return Err(e.into()),
        };

        let changed = if self.overwrite {
            song.metadata.overwrite_with(&found)
        } else {
            song.metadata.fill_missing(&found)
        };
        if !changed {
            return Ok(Identified::Unchanged);
        }

        self.library.save_song(&song).await?;
        Ok(Identified::Updated)
    }
}

#[async_trait]
impl Task for IdentifyTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Identify
    }

    fn items(&self) -> &[PathBuf] {
        &self.songs
    }

    fn try_merge(&self, other: &dyn Task) -> Merge {
        if other.kind() != TaskKind::Identify {
            return Merge::Unchanged;
        }
        let queued = other.items();
        let remaining: Vec<PathBuf> = self
            .songs
            .iter()
            .filter(|s| !queued.contains(*s))
            .cloned()
            .collect();

        if remaining.is_empty() {
            Merge::Redundant
        } else if remaining.len() == self.songs.len() {
            Merge::Unchanged
        } else {
            Merge::Replace(Box::new(self.narrowed(remaining)))
        }
    }

    fn describe(&self) -> String {
        format!("identify {} songs", self.songs.len())
    }

    async fn execute(&self, ctx: &TaskContext) -> TaskOutcome {
        let total = self.songs.len();
        let mut tally = ItemTally::default();
        let mut updated = Vec::new();
        let mut first_error = None;

        ctx.set_message(format!("Identifying {total} songs"));
        for path in &self.songs {
            match self.identify_one(path).await {
                Ok(Identified::Updated) => {
                    debug!("Updated tags of {}", path.display());
                    tally.succeeded += 1;
                    updated.push(path.clone());
                }
                Ok(Identified::Unchanged) => tally.succeeded += 1,
                Ok(Identified::NoMatch) => {
                    debug!("No match for {}", path.display());
                    tally.skipped += 1;
                }
                Err(TaskError::Lookup(e)) if e.is_fatal() => {
                    warn!(
                        processed = tally.processed(),
                        remaining = total - tally.processed(),
                        "Identification aborted: {}",
                        e
                    );
                    return TaskOutcome::aborted(tally, updated, e.to_string()).with_message(
                        format!(
                            "Stopped after {} of {} songs: {}",
                            tally.processed(),
                            total,
                            e
                        ),
                    );
                }
                Err(e) => {
                    warn!("Failed to identify {}: {}", path.display(), e);
                    note_error(&mut first_error, &e);
                    tally.failed += 1;
                }
            }
            ctx.report(tally, total);
        }

        info!(
            identified = tally.succeeded,
            unmatched = tally.skipped,
            failed = tally.failed,
            "Identification finished"
        );
        TaskOutcome::completed(tally, updated)
            .with_first_error(first_error)
            .with_message(format!(
                "Identified {} of {} songs ({} without match, {} failed)",
                tally.succeeded, total, tally.skipped, tally.failed
            ))
    }
}
