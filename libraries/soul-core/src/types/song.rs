/// Song domain type
use crate::types::SortAttribute;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A song file and the tags read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Location of the file; songs are identified by path
    pub path: PathBuf,

    /// Tag metadata
    #[serde(default)]
    pub metadata: SongMetadata,
}

impl Song {
    /// Create a song with no metadata
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            metadata: SongMetadata::default(),
        }
    }

    /// Create a song with the given metadata
    pub fn with_metadata(path: impl Into<PathBuf>, metadata: SongMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// File extension, lower-cased
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }

    /// File name without extension
    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    /// Whether the song lives below `root`
    pub fn is_inside(&self, root: &Path) -> bool {
        self.path.starts_with(root)
    }
}

/// Tag metadata of a song
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Album artist
    pub album_artist: Option<String>,

    /// Genre
    pub genre: Option<String>,

    /// Release year
    pub year: Option<u32>,

    /// Track number
    pub track_number: Option<u32>,

    /// Disc number
    pub disc_number: Option<u32>,
}

impl SongMetadata {
    /// Check if metadata is mostly empty (only title or nothing)
    pub fn is_sparse(&self) -> bool {
        self.artist.is_none() && self.album.is_none() && self.genre.is_none()
    }

    /// Copy every field of `other` that is missing here
    ///
    /// Returns whether anything changed.
    pub fn fill_missing(&mut self, other: &SongMetadata) -> bool {
        self.merge(other, false)
    }

    /// Replace fields with every field `other` has
    ///
    /// Returns whether anything changed.
    pub fn overwrite_with(&mut self, other: &SongMetadata) -> bool {
        self.merge(other, true)
    }

    fn merge(&mut self, other: &SongMetadata, overwrite: bool) -> bool {
        let mut changed = false;
        changed |= merge_field(&mut self.title, &other.title, overwrite);
        changed |= merge_field(&mut self.artist, &other.artist, overwrite);
        changed |= merge_field(&mut self.album, &other.album, overwrite);
        changed |= merge_field(&mut self.album_artist, &other.album_artist, overwrite);
        changed |= merge_field(&mut self.genre, &other.genre, overwrite);
        changed |= merge_field(&mut self.year, &other.year, overwrite);
        changed |= merge_field(&mut self.track_number, &other.track_number, overwrite);
        changed |= merge_field(&mut self.disc_number, &other.disc_number, overwrite);
        changed
    }

    /// Value of a sortable attribute
    ///
    /// `AlbumArtist` falls back to `Artist`. Blank values count as missing.
    pub fn attribute(&self, attribute: SortAttribute) -> Option<String> {
        let value = match attribute {
            SortAttribute::AlbumArtist => self
                .album_artist
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .or(self.artist.as_deref())
                .map(str::to_string),
            SortAttribute::Artist => self.artist.clone(),
            SortAttribute::Album => self.album.clone(),
            SortAttribute::Genre => self.genre.clone(),
            SortAttribute::Year => self.year.map(|y| y.to_string()),
        };
        value.filter(|s| !s.trim().is_empty())
    }
}

fn merge_field<T: Clone + PartialEq>(dst: &mut Option<T>, src: &Option<T>, overwrite: bool) -> bool {
    match src {
        Some(value) if (overwrite || dst.is_none()) && dst.as_ref() != Some(value) => {
            *dst = Some(value.clone());
            true
        }
        _ => false,
    }
}
