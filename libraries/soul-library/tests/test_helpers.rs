//! Shared fixtures for the file-system tests

use soul_core::SongMetadata;
use soul_library::tags::write_metadata;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Write a short silent 16-bit mono PCM WAV, creating parent folders
///
/// `seed` changes the sample data so files can differ in content.
pub fn write_wav(path: &Path, seed: u8) -> PathBuf {
    let samples = 800u32;
    let data_len = samples * 2;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8000u32.to_le_bytes());
    bytes.extend_from_slice(&16000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(bytes.len() + data_len as usize, seed);

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

/// WAV file carrying `metadata` in its tags
pub fn write_tagged_wav(path: &Path, seed: u8, metadata: &SongMetadata) -> PathBuf {
    let path = write_wav(path, seed);
    write_metadata(&path, metadata).unwrap();
    path
}

pub fn album(artist: &str, album: &str, title: &str, track: u32) -> SongMetadata {
    SongMetadata {
        title: Some(title.to_string()),
        artist: Some(artist.to_string()),
        album: Some(album.to_string()),
        track_number: Some(track),
        ..SongMetadata::default()
    }
}
