//! Import: bring files from outside into the library root

use super::{free_path, normalize_path, note_error, TRANSFER_ATTEMPTS};
use crate::error::TaskError;
use crate::kind::TaskKind;
use crate::status::ItemTally;
use crate::task::{Merge, Task, TaskContext, TaskOutcome};
use async_trait::async_trait;
use soul_core::{ImportAction, Library, SoulError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ImportTask {
    sources: Vec<PathBuf>,
    library: Arc<dyn Library>,
    action: ImportAction,
}

impl ImportTask {
    /// Sources are made absolute so they compare reliably with queued
    /// imports and the library root
    pub fn new(library: Arc<dyn Library>, sources: Vec<PathBuf>, action: ImportAction) -> Self {
        let mut sources: Vec<PathBuf> = sources.iter().map(|s| normalize_path(s)).collect();
        sources.sort();
        sources.dedup();
        Self {
            sources,
            library,
            action,
        }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn action(&self) -> ImportAction {
        self.action
    }

    async fn import_one(&self, source: &Path) -> Result<Option<PathBuf>, TaskError> {
        if source.starts_with(normalize_path(self.library.root())) {
            return Ok(None);
        }
        if !self.library.file_exists(source).await {
            return Err(TaskError::FileNotFound(source.to_path_buf()));
        }
        let file_name = source
            .file_name()
            .ok_or_else(|| TaskError::FileNotFound(source.to_path_buf()))?;
        let wanted = self.library.root().join(file_name);

        let mut attempt = 1;
        loop {
            let destination = free_path(self.library.as_ref(), &wanted, None).await?;
            let transferred = match self.action {
                ImportAction::Copy => self.library.copy_file(source, &destination).await,
                ImportAction::Move => self.library.move_file(source, &destination).await,
            };
            match transferred {
                Ok(()) => return Ok(Some(destination)),
                Err(SoulError::AlreadyExists(_)) if attempt < TRANSFER_ATTEMPTS => {
                    debug!("{} taken concurrently, retrying", destination.display());
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl Task for ImportTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Import
    }

    fn items(&self) -> &[PathBuf] {
        &self.sources
    }

    fn try_merge(&self, other: &dyn Task) -> Merge {
        if other.kind() != TaskKind::Import {
            return Merge::Unchanged;
        }
        let covered = other.items();
        let uncovered: Vec<PathBuf> = self
            .sources
            .iter()
            .filter(|s| !covered.contains(*s))
            .cloned()
            .collect();

        if uncovered.is_empty() {
            Merge::Redundant
        } else if uncovered.len() == self.sources.len() {
            Merge::Unchanged
        } else {
            Merge::Replace(Box::new(Self {
                sources: uncovered,
                library: Arc::clone(&self.library),
                action: self.action,
            }))
        }
    }

    fn describe(&self) -> String {
        format!("{} import of {} files", self.action, self.sources.len())
    }

    async fn execute(&self, ctx: &TaskContext) -> TaskOutcome {
        let total = self.sources.len();
        let mut tally = ItemTally::default();
        let mut imported = Vec::new();
        let mut first_error = None;

        ctx.set_message(format!("Importing {total} files"));
        for source in &self.sources {
            match self.import_one(source).await {
                Ok(Some(destination)) => {
                    debug!(
                        "Imported {} -> {}",
                        source.display(),
                        destination.display()
                    );
                    tally.succeeded += 1;
                    imported.push(destination);
                }
                Ok(None) => {
                    debug!("Skipping {}: already in library", source.display());
                    tally.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to import {}: {}", source.display(), e);
                    note_error(&mut first_error, &e);
                    tally.failed += 1;
                }
            }
            ctx.report(tally, total);
        }

        info!(
            imported = tally.succeeded,
            skipped = tally.skipped,
            failed = tally.failed,
            "Import finished"
        );
        TaskOutcome::completed(tally, imported)
            .with_first_error(first_error)
            .with_message(format!(
                "Imported {} of {} files ({} skipped, {} failed)",
                tally.succeeded, total, tally.skipped, tally.failed
            ))
    }
}
