//! Construction of tasks from the shared collaborators

use crate::tasks::{IdentifyTask, ImportTask, SortScope, SortTask};
use soul_core::{Fingerprinter, ImportAction, Library, MetadataProvider, SettingsProvider};
use std::path::PathBuf;
use std::sync::Arc;

/// Holds the collaborators every task needs and builds tasks from them
#[derive(Clone)]
pub struct TaskFactory {
    library: Arc<dyn Library>,
    fingerprinter: Arc<dyn Fingerprinter>,
    provider: Arc<dyn MetadataProvider>,
    settings: Arc<dyn SettingsProvider>,
    import_action: ImportAction,
    overwrite_tags: bool,
}

impl TaskFactory {
    pub fn new(
        library: Arc<dyn Library>,
        fingerprinter: Arc<dyn Fingerprinter>,
        provider: Arc<dyn MetadataProvider>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            library,
            fingerprinter,
            provider,
            settings,
            import_action: ImportAction::default(),
            overwrite_tags: false,
        }
    }

    #[must_use]
    pub fn with_import_action(mut self, action: ImportAction) -> Self {
        self.import_action = action;
        self
    }

    #[must_use]
    pub fn with_overwrite_tags(mut self, overwrite: bool) -> Self {
        self.overwrite_tags = overwrite;
        self
    }

    pub fn library(&self) -> &Arc<dyn Library> {
        &self.library
    }

    pub fn import(&self, sources: Vec<PathBuf>) -> ImportTask {
        ImportTask::new(Arc::clone(&self.library), sources, self.import_action)
    }

    pub fn identify(&self, songs: Vec<PathBuf>) -> IdentifyTask {
        IdentifyTask::new(
            Arc::clone(&self.library),
            Arc::clone(&self.fingerprinter),
            Arc::clone(&self.provider),
            songs,
        )
        .overwriting(self.overwrite_tags)
    }

    /// Sort reading the current settings
    pub fn sort(&self, scope: SortScope) -> SortTask {
        SortTask::new(Arc::clone(&self.library), self.settings.as_ref(), scope)
    }
}
