//! Drop-folder watcher
//!
//! Watches folders for audio files arriving (created or moved in) and hands
//! each debounced batch to a callback. The callback runs on the debouncer's
//! thread, outside of any async runtime.

use crate::scanner::is_audio_file;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use soul_core::{Result, SoulError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Default debounce window; copies into a drop folder take a moment to settle
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Receives the audio files of one debounced batch
pub type ArrivalCallback = Box<dyn Fn(Vec<PathBuf>) + Send + Sync>;

pub struct ImportWatcher {
    folders: Vec<PathBuf>,
    // Dropping the debouncer stops watching
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl ImportWatcher {
    /// Start watching `folders` recursively
    pub fn start(
        folders: &[PathBuf],
        debounce: Duration,
        on_arrival: ArrivalCallback,
    ) -> Result<Self> {
        let mut debouncer = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let arrivals = audio_arrivals(events.iter().map(|e| &e.event));
                    if !arrivals.is_empty() {
                        info!(files = arrivals.len(), "Audio files arrived");
                        on_arrival(arrivals);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        error!("Watcher error: {:?}", error);
                    }
                }
            }
        })
        .map_err(|e| SoulError::Other(format!("Failed to create debouncer: {e}")))?;

        for folder in folders {
            std::fs::create_dir_all(folder)?;
            debouncer
                .watch(folder, RecursiveMode::Recursive)
                .map_err(|e| {
                    SoulError::Other(format!("Failed to watch {}: {e}", folder.display()))
                })?;
            info!("Watching {}", folder.display());
        }

        Ok(Self {
            folders: folders.to_vec(),
            _debouncer: debouncer,
        })
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }
}

/// Audio files that appeared in a batch of events, sorted and deduplicated
pub fn audio_arrivals<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<PathBuf> {
    let mut arrivals: Vec<PathBuf> = events
        .into_iter()
        .filter_map(|event| match event.kind {
            EventKind::Create(_) => event.paths.first(),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.first(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.last(),
            _ => None,
        })
        .filter(|path| is_audio_file(path))
        .cloned()
        .collect();
    arrivals.sort();
    arrivals.dedup();
    arrivals
}
