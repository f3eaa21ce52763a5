//! Target paths for the sorter
//!
//! A song lands at `<root>/<attr 1>/<attr 2>/.../<NN> - <Title>.<ext>`, one
//! folder per configured attribute with fallbacks for missing values. Songs on
//! a disc other than the first get a `D-NN` prefix.

use soul_core::{Song, SortSettings};
use std::path::PathBuf;

/// Path the song should live at under the given settings
pub fn target_path(settings: &SortSettings, song: &Song) -> PathBuf {
    let mut path = settings.library_root.clone();
    for attribute in &settings.attribute_order {
        let value = song
            .metadata
            .attribute(*attribute)
            .unwrap_or_else(|| attribute.fallback().to_string());
        path.push(sanitize_path_component(&value));
    }
    path.push(file_name(song));
    path
}

/// `NN - Title.ext`, the title falling back to the current file stem
pub fn file_name(song: &Song) -> String {
    let title = song
        .metadata
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| song.file_stem())
        .unwrap_or("Untitled");

    let prefix = match (song.metadata.disc_number, song.metadata.track_number) {
        (Some(disc), Some(track)) if disc > 1 => format!("{disc}-{track:02} - "),
        (_, Some(track)) => format!("{track:02} - "),
        _ => String::new(),
    };

    let stem = sanitize_path_component(&format!("{prefix}{title}"));
    match song.extension() {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

/// Make one path component safe on every common file system
///
/// Reserved characters and control characters become `_`, surrounding
/// whitespace and trailing dots are trimmed, reserved Windows device names get
/// a `_` prefix.
pub fn sanitize_path_component(s: &str) -> String {
    const RESERVED: [&str; 22] = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    let replaced: String = s
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    if trimmed.is_empty() {
        "_".to_string()
    } else if RESERVED.contains(&trimmed.to_uppercase().as_str()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soul_core::{SongMetadata, SortAttribute};
    use std::path::Path;

    fn tagged(path: &str) -> Song {
        Song::with_metadata(
            path,
            SongMetadata {
                title: Some("Bohemian Rhapsody".to_string()),
                artist: Some("Queen".to_string()),
                album: Some("A Night at the Opera".to_string()),
                track_number: Some(11),
                year: Some(1975),
                ..SongMetadata::default()
            },
        )
    }

    #[test]
    fn test_default_order() {
        let settings = SortSettings::new("/music");
        let target = target_path(&settings, &tagged("/inbox/track.FLAC"));
        assert_eq!(
            target,
            Path::new("/music/Queen/A Night at the Opera/11 - Bohemian Rhapsody.flac")
        );
    }

    #[test]
    fn test_fallbacks_for_missing_tags() {
        let settings = SortSettings::new("/music").with_order(vec![
            SortAttribute::Genre,
            SortAttribute::Artist,
            SortAttribute::Year,
            SortAttribute::Album,
        ]);
        let target = target_path(&settings, &Song::new("/inbox/demo take.mp3"));
        assert_eq!(
            target,
            Path::new("/music/Unknown Genre/Unknown Artist/0000/Unknown Album/demo take.mp3")
        );
    }

    #[test]
    fn test_multi_disc_prefix() {
        let mut song = tagged("/inbox/a.mp3");
        song.metadata.disc_number = Some(2);
        song.metadata.track_number = Some(3);
        assert_eq!(file_name(&song), "2-03 - Bohemian Rhapsody.mp3");

        song.metadata.disc_number = Some(1);
        assert_eq!(file_name(&song), "03 - Bohemian Rhapsody.mp3");
    }

    #[test]
    fn test_components_are_sanitized() {
        let mut song = tagged("/inbox/a.ogg");
        song.metadata.artist = Some("AC/DC".to_string());
        song.metadata.album = Some("Who Made Who?".to_string());
        song.metadata.title = Some("Ride On...".to_string());
        let target = target_path(&SortSettings::new("/music"), &song);
        assert_eq!(
            target,
            Path::new("/music/AC_DC/Who Made Who_/11 - Ride On.ogg")
        );
    }

    #[test]
    fn test_sanitize_path_component() {
        assert_eq!(sanitize_path_component("Normal Name"), "Normal Name");
        assert_eq!(sanitize_path_component("a<b>c:d"), "a_b_c_d");
        assert_eq!(sanitize_path_component("  spaced  "), "spaced");
        assert_eq!(sanitize_path_component("dots..."), "dots");
        assert_eq!(sanitize_path_component("CON"), "_CON");
        assert_eq!(sanitize_path_component("lpt1"), "_lpt1");
        assert_eq!(sanitize_path_component(""), "_");
        assert_eq!(sanitize_path_component("tab\there"), "tab_here");
    }
}
