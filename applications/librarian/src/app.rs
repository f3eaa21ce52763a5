//! Wiring of library, identifier and queue

use crate::config::LibrarianConfig;
use crate::error::{LibrarianError, Result};
use soul_core::Library;
use soul_library::{collect_audio_files, FilenameIdentifier, FsLibrary, ImportWatcher};
use soul_tasks::{FollowUps, Queue, QueueEvent, SortScope, Task, TaskFactory, TaskReport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{error, info, warn};

/// A running queue over the configured library
pub struct Librarian {
    library: Arc<FsLibrary>,
    factory: TaskFactory,
    queue: Arc<Queue>,
}

impl Librarian {
    /// Open the library and start the queue
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(config: &LibrarianConfig) -> Result<Self> {
        let library = Arc::new(FsLibrary::new(&config.library_root)?);
        let identifier = Arc::new(FilenameIdentifier::new().with_library_root(library.root()));
        let factory = TaskFactory::new(
            library.clone(),
            identifier.clone(),
            identifier,
            Arc::new(config.sort_settings()),
        )
        .with_import_action(config.import_action)
        .with_overwrite_tags(config.overwrite_tags);

        let queue = Queue::start(config.queue);
        FollowUps::install(&queue, factory.clone(), config.follow_ups);

        info!(
            root = %library.root().display(),
            action = %config.import_action,
            "Library opened"
        );
        Ok(Self {
            library,
            factory,
            queue,
        })
    }

    pub fn queue(&self) -> &Arc<Queue> {
        &self.queue
    }

    pub fn library(&self) -> &Arc<FsLibrary> {
        &self.library
    }

    /// Import files and folders, with the configured follow-ups
    pub async fn import(&self, paths: &[PathBuf]) -> Result<Vec<TaskReport>> {
        let sources = collect_audio_files(paths);
        if sources.is_empty() {
            return Err(LibrarianError::NothingToDo(
                "no audio files in the given paths".to_string(),
            ));
        }
        self.run(Box::new(self.factory.import(sources))).await
    }

    /// Identify every song in the library
    pub async fn identify(&self) -> Result<Vec<TaskReport>> {
        let songs: Vec<PathBuf> = self
            .library
            .all_songs()
            .await?
            .into_iter()
            .map(|song| song.path)
            .collect();
        if songs.is_empty() {
            return Err(LibrarianError::NothingToDo("the library is empty".to_string()));
        }
        self.run(Box::new(self.factory.identify(songs))).await
    }

    /// Sort the whole library
    pub async fn sort(&self) -> Result<Vec<TaskReport>> {
        self.run(Box::new(self.factory.sort(SortScope::Library))).await
    }

    /// Submit `task` and collect every report until the queue is idle,
    /// follow-ups included
    async fn run(&self, task: Box<dyn Task>) -> Result<Vec<TaskReport>> {
        let mut events = self.queue.subscribe();
        self.queue.add(task)?;
        self.queue.wait_idle().await;

        let mut reports = Vec::new();
        loop {
            match events.try_recv() {
                Ok(QueueEvent::TaskFinished(report)) => reports.push(report),
                Ok(_) => {}
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Some task reports were dropped");
                }
                Err(_) => break,
            }
        }
        Ok(reports)
    }

    /// Watch the drop folders and import arrivals until `stop` resolves
    ///
    /// Reports are handed to `on_report` as tasks finish.
    pub async fn watch(
        &self,
        config: &LibrarianConfig,
        stop: impl std::future::Future<Output = ()>,
        on_report: impl Fn(&TaskReport),
    ) -> Result<()> {
        if config.drop_folders.is_empty() {
            return Err(LibrarianError::Config(
                "No drop folders configured (set drop_folders)".to_string(),
            ));
        }

        let queue = Arc::clone(&self.queue);
        let factory = self.factory.clone();
        let _watcher = ImportWatcher::start(
            &config.drop_folders,
            config.debounce(),
            Box::new(move |paths| {
                let count = paths.len();
                match queue.add(Box::new(factory.import(paths))) {
                    Ok(handle) => info!(task = handle.id(), files = count, "Import queued"),
                    Err(e) => error!("Cannot queue import: {}", e),
                }
            }),
        )?;

        let mut events = self.queue.subscribe();
        tokio::pin!(stop);
        loop {
            tokio::select! {
                () = &mut stop => break,
                event = events.recv() => match event {
                    Ok(QueueEvent::TaskFinished(report)) => on_report(&report),
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Some task reports were dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!("Stopping watcher");
        Ok(())
    }

    /// Cancel pending work and wait for running tasks
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}
