//! Tag reading and writing with lofty

use lofty::{Accessor, ItemKey, Probe, Tag, TagExt, TaggedFileExt};
use sha2::{Digest, Sha256};
use soul_core::{Result, SongMetadata, SoulError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

fn text(value: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read the tags of an audio file
///
/// Files without any tag yield empty metadata.
pub fn read_metadata(path: &Path) -> Result<SongMetadata> {
    let tagged_file = Probe::open(path)
        .map_err(|e| SoulError::metadata(format!("Failed to open {}: {}", path.display(), e)))?
        .read()
        .map_err(|e| SoulError::metadata(format!("Failed to read {}: {}", path.display(), e)))?;

    let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
        return Ok(SongMetadata::default());
    };

    Ok(SongMetadata {
        title: text(tag.title()),
        artist: text(tag.artist()),
        album: text(tag.album()),
        album_artist: tag
            .get_string(&ItemKey::AlbumArtist)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        genre: text(tag.genre()),
        year: tag.year(),
        track_number: tag.track(),
        disc_number: tag.disk(),
    })
}

/// Write `metadata` into the file's primary tag, creating it if needed
///
/// Fields that are `None` are removed from the tag.
pub fn write_metadata(path: &Path, metadata: &SongMetadata) -> Result<()> {
    let mut tagged_file = Probe::open(path)
        .map_err(|e| SoulError::metadata(format!("Failed to open {}: {}", path.display(), e)))?
        .read()
        .map_err(|e| SoulError::metadata(format!("Failed to read {}: {}", path.display(), e)))?;

    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| SoulError::metadata(format!("No writable tag in {}", path.display())))?;

    match &metadata.title {
        Some(title) => tag.set_title(title.clone()),
        None => tag.remove_title(),
    }
    match &metadata.artist {
        Some(artist) => tag.set_artist(artist.clone()),
        None => tag.remove_artist(),
    }
    match &metadata.album {
        Some(album) => tag.set_album(album.clone()),
        None => tag.remove_album(),
    }
    match &metadata.album_artist {
        Some(album_artist) => {
            tag.insert_text(ItemKey::AlbumArtist, album_artist.clone());
        }
        None => {
            tag.remove_key(&ItemKey::AlbumArtist);
        }
    }
    match &metadata.genre {
        Some(genre) => tag.set_genre(genre.clone()),
        None => tag.remove_genre(),
    }
    match metadata.year {
        Some(year) => tag.set_year(year),
        None => tag.remove_year(),
    }
    match metadata.track_number {
        Some(track) => tag.set_track(track),
        None => tag.remove_track(),
    }
    match metadata.disc_number {
        Some(disc) => tag.set_disk(disc),
        None => tag.remove_disk(),
    }

    tag.save_to_path(path).map_err(|e: lofty::error::LoftyError| {
        SoulError::metadata(format!("Failed to write tags to {}: {}", path.display(), e))
    })
}

/// SHA-256 of the file content, hex encoded
pub fn file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SoulError::SongNotFound(path.to_path_buf()),
        _ => SoulError::Io(e),
    })?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
