/// Offline identification from file names
use async_trait::async_trait;
use soul_core::{Fingerprinter, LookupError, MetadataProvider, Song, SongMetadata};
use std::path::{Path, PathBuf};

/// Derives tags from names like `03 - Artist - Title.mp3`
///
/// Recognised stems:
/// - `NN - Artist - Title`
/// - `Artist - Title`
/// - `NN - Title` or `NN. Title`
///
/// Anything else is `NoMatch`. As a metadata provider it fills the album from
/// the parent folder name when the match has none, except for the library
/// root itself where freshly imported files land.
#[derive(Debug, Clone, Default)]
pub struct FilenameIdentifier {
    library_root: Option<PathBuf>,
}

impl FilenameIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never take the album from `root`
    #[must_use]
    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_root = Some(root.into());
        self
    }

    fn album_folder<'a>(&self, path: &'a Path) -> Option<&'a str> {
        let dir = path.parent()?;
        if self.library_root.as_deref() == Some(dir) {
            return None;
        }
        dir.file_name()?.to_str()
    }

    /// Parse a file stem into partial metadata
    pub fn parse_stem(stem: &str) -> Option<SongMetadata> {
        let (track_number, rest) = split_track_number(stem.trim());
        let parts: Vec<&str> = rest
            .split(" - ")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let (artist, title) = match parts.as_slice() {
            [artist, title] => (Some(*artist), *title),
            [title] if track_number.is_some() => (None, *title),
            _ => return None,
        };

        Some(SongMetadata {
            title: Some(title.to_string()),
            artist: artist.map(str::to_string),
            track_number,
            ..SongMetadata::default()
        })
    }
}

/// Leading `NN - ` or `NN. ` track number
fn split_track_number(stem: &str) -> (Option<u32>, &str) {
    let digits = stem.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 3 {
        return (None, stem);
    }
    let (number, rest) = stem.split_at(digits);
    let rest = rest
        .strip_prefix(" - ")
        .or_else(|| rest.strip_prefix(". "))
        .or_else(|| rest.strip_prefix(' '));
    match (number.parse().ok(), rest) {
        (Some(n), Some(rest)) => (Some(n), rest),
        _ => (None, stem),
    }
}

#[async_trait]
impl Fingerprinter for FilenameIdentifier {
    async fn identify(&self, path: &Path) -> Result<SongMetadata, LookupError> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::parse_stem)
            .ok_or(LookupError::NoMatch)
    }
}

#[async_trait]
impl MetadataProvider for FilenameIdentifier {
    async fn enrich(
        &self,
        song: &Song,
        partial: &SongMetadata,
    ) -> Result<SongMetadata, LookupError> {
        let mut found = partial.clone();
        if found.album.is_none() {
            found.album = self.album_folder(&song.path).map(str::to_string);
        }
        if found == SongMetadata::default() {
            return Err(LookupError::NoMatch);
        }
        Ok(found)
    }
}
