//! Expansion of paths into audio files

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Supported audio file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "opus", "wav", "aac", "m4a", "aif", "aiff",
];

/// Check if a path is an audio file based on extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Every audio file below `dir`, in walk order
pub fn scan_directory(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry below {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Expand folders into their audio files, sorted and without duplicates
///
/// Plain file paths are kept as given, even when they do not exist, so the
/// importer can report them.
pub fn collect_audio_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(scan_directory(path));
        } else if is_audio_file(path) || !path.exists() {
            files.push(path.clone());
        } else {
            warn!("Ignoring {}: not an audio file", path.display());
        }
    }
    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.flac")));
        assert!(is_audio_file(Path::new("test.MP3")));
        assert!(is_audio_file(Path::new("/path/to/test.m4a")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("README")));
    }

    #[test]
    fn test_collect_expands_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("album");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.mp3"), b"a").unwrap();
        fs::write(nested.join("b.flac"), b"b").unwrap();
        fs::write(nested.join("cover.jpg"), b"c").unwrap();
        let single = dir.path().join("a.mp3");

        let files = collect_audio_files(&[dir.path().to_path_buf(), single.clone()]);

        assert_eq!(files, vec![single, nested.join("b.flac")]);
    }

    #[test]
    fn test_collect_keeps_missing_files() {
        let missing = PathBuf::from("/nonexistent/song.mp3");
        assert_eq!(collect_audio_files(&[missing.clone()]), vec![missing]);
    }
}
