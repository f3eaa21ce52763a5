/// Collaborator traits consumed by the background task queue
use crate::error::{LookupError, Result};
use crate::events::LibraryEvent;
use crate::types::{Song, SongMetadata, SortSettings};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::broadcast;

/// File-system and tag abstraction over the music library
///
/// Implementations must broadcast a [`LibraryEvent`] for every change they
/// make so that views can stay current without polling.
#[async_trait]
pub trait Library: Send + Sync {
    /// Root folder of the managed library
    fn root(&self) -> &Path;

    /// Every song currently below the library root
    async fn all_songs(&self) -> Result<Vec<Song>>;

    /// Read a song and its tags from disk
    ///
    /// # Errors
    /// Returns `SongNotFound` if the file does not exist
    async fn read_song(&self, path: &Path) -> Result<Song>;

    /// Whether a file exists at `path`
    async fn file_exists(&self, path: &Path) -> bool;

    /// Write the song's metadata back to its tags
    async fn save_song(&self, song: &Song) -> Result<()>;

    /// Copy a file to `to`, creating parent folders
    ///
    /// # Errors
    /// Returns `AlreadyExists` if `to` is taken
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move a file to `to`, creating parent folders
    ///
    /// # Errors
    /// Returns `AlreadyExists` if `to` is taken
    async fn move_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Delete a song file
    async fn delete_song(&self, path: &Path) -> Result<()>;

    /// Content hash used to detect true duplicates
    async fn content_hash(&self, path: &Path) -> Result<String>;

    /// Subscribe to change notifications
    fn subscribe(&self) -> broadcast::Receiver<LibraryEvent>;
}

/// Audio fingerprint identification service
#[async_trait]
pub trait Fingerprinter: Send + Sync {
    /// Identify the recording at `path`
    ///
    /// Returns whatever partial metadata the service could match.
    async fn identify(&self, path: &Path) -> std::result::Result<SongMetadata, LookupError>;
}

/// Metadata enrichment service
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Complete `partial` (the fingerprint match) for `song`
    async fn enrich(
        &self,
        song: &Song,
        partial: &SongMetadata,
    ) -> std::result::Result<SongMetadata, LookupError>;
}

/// Source of user settings
pub trait SettingsProvider: Send + Sync {
    /// Current sort settings
    fn sort_settings(&self) -> SortSettings;
}

/// Fixed settings, for wiring without a settings store
impl SettingsProvider for SortSettings {
    fn sort_settings(&self) -> SortSettings {
        self.clone()
    }
}

