/// `Library` over the real file system
use crate::scanner::scan_directory;
use crate::tags::{file_hash, read_metadata, write_metadata};
use async_trait::async_trait;
use soul_core::{Library, LibraryEvent, Result, Song, SoulError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tokio::task;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 256;

/// Music library rooted at a folder
///
/// Blocking file and tag work runs on the blocking thread pool.
pub struct FsLibrary {
    root: PathBuf,
    events: broadcast::Sender<LibraryEvent>,
}

impl FsLibrary {
    /// Open the library at `root`, creating the folder if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(SoulError::invalid_input(format!(
                "Library root must be absolute: {}",
                root.display()
            )));
        }
        fs::create_dir_all(&root)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self { root, events })
    }

    fn emit(&self, event: LibraryEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| SoulError::Other(format!("Blocking task failed: {e}")))?
}

fn not_found(path: &Path) -> impl FnOnce(io::Error) -> SoulError + '_ {
    move |e| match e.kind() {
        ErrorKind::NotFound => SoulError::SongNotFound(path.to_path_buf()),
        _ => SoulError::Io(e),
    }
}

fn read_song_blocking(path: &Path) -> Result<Song> {
    if !path.is_file() {
        return Err(SoulError::SongNotFound(path.to_path_buf()));
    }
    let metadata = match read_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            // Untagged or unparseable files still take part with empty tags
            debug!("No tags for {}: {}", path.display(), e);
            Default::default()
        }
    };
    Ok(Song::with_metadata(path, metadata))
}

/// Copy into a fresh file, never replacing an existing one
fn copy_new(from: &Path, to: &Path) -> Result<()> {
    let mut source = File::open(from).map_err(not_found(from))?;
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut target = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => SoulError::AlreadyExists(to.to_path_buf()),
            _ => SoulError::Io(e),
        })?;

    if let Err(e) = io::copy(&mut source, &mut target) {
        drop(target);
        let _ = fs::remove_file(to);
        return Err(e.into());
    }
    Ok(())
}

fn move_new(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(SoulError::SongNotFound(from.to_path_buf()));
    }
    if to.exists() {
        return Err(SoulError::AlreadyExists(to.to_path_buf()));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            // Typically a move across file systems
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            copy_new(from, to)?;
            fs::remove_file(from).map_err(not_found(from))
        }
    }
}

#[async_trait]
impl Library for FsLibrary {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn all_songs(&self) -> Result<Vec<Song>> {
        let root = self.root.clone();
        blocking(move || {
            let songs = scan_directory(&root)
                .into_iter()
                .filter_map(|path| match read_song_blocking(&path) {
                    Ok(song) => Some(song),
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        None
                    }
                })
                .collect();
            Ok(songs)
        })
        .await
    }

    async fn read_song(&self, path: &Path) -> Result<Song> {
        let path = path.to_path_buf();
        blocking(move || read_song_blocking(&path)).await
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn save_song(&self, song: &Song) -> Result<()> {
        let path = song.path.clone();
        let metadata = song.metadata.clone();
        blocking(move || {
            if !path.is_file() {
                return Err(SoulError::SongNotFound(path));
            }
            write_metadata(&path, &metadata)
        })
        .await?;

        self.emit(LibraryEvent::SongChanged {
            path: song.path.clone(),
        });
        Ok(())
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let (source, target) = (from.to_path_buf(), to.to_path_buf());
        blocking(move || copy_new(&source, &target)).await?;

        debug!("Copied {} -> {}", from.display(), to.display());
        self.emit(LibraryEvent::SongCreated {
            path: to.to_path_buf(),
        });
        Ok(())
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        let (source, target) = (from.to_path_buf(), to.to_path_buf());
        blocking(move || move_new(&source, &target)).await?;

        debug!("Moved {} -> {}", from.display(), to.display());
        if from.starts_with(&self.root) {
            self.emit(LibraryEvent::SongRenamed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        } else {
            self.emit(LibraryEvent::SongCreated {
                path: to.to_path_buf(),
            });
        }
        Ok(())
    }

    async fn delete_song(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(not_found(path))?;

        debug!("Deleted {}", path.display());
        self.emit(LibraryEvent::SongDeleted {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn content_hash(&self, path: &Path) -> Result<String> {
        let path = path.to_path_buf();
        blocking(move || file_hash(&path)).await
    }

    fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }
}
