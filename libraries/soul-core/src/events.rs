//! Change notifications emitted by a library implementation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A change to the songs stored in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// A song file appeared in the library
    SongCreated { path: PathBuf },
    /// A song's tags were rewritten
    SongChanged { path: PathBuf },
    /// A song file was removed from the library
    SongDeleted { path: PathBuf },
    /// A song file moved inside the library
    SongRenamed { from: PathBuf, to: PathBuf },
}

impl LibraryEvent {
    /// The path the song lives at after the event
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::SongCreated { path } | Self::SongChanged { path } | Self::SongDeleted { path } => {
                path
            }
            Self::SongRenamed { to, .. } => to,
        }
    }
}
