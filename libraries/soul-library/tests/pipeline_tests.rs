//! Import, identify and sort against a real folder tree

mod test_helpers;

use soul_core::{ImportAction, Library, SongMetadata, SortAttribute, SortSettings};
use soul_library::{collect_audio_files, FilenameIdentifier, FsLibrary};
use soul_tasks::{
    FollowUpPolicy, FollowUps, Queue, QueueConfig, QueueEvent, SortScope, TaskFactory, TaskKind,
    TaskStatus,
};
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::*;

fn wire(dir: &TempDir, action: ImportAction) -> (Arc<FsLibrary>, TaskFactory) {
    init_tracing();
    let root = dir.path().join("music");
    let library = Arc::new(FsLibrary::new(&root).unwrap());
    let identifier = Arc::new(FilenameIdentifier::new().with_library_root(&root));
    let settings =
        SortSettings::new(&root).with_order(vec![SortAttribute::Artist, SortAttribute::Album]);

    let factory = TaskFactory::new(
        library.clone(),
        identifier.clone(),
        identifier,
        Arc::new(settings),
    )
    .with_import_action(action);
    (library, factory)
}

#[tokio::test]
async fn test_drop_folder_ends_up_sorted() {
    let dir = TempDir::new().unwrap();
    let (library, factory) = wire(&dir, ImportAction::Move);
    let inbox = dir.path().join("inbox");

    // Album tag present, artist and title only in the file name
    let partial = SongMetadata {
        album: Some("Moon Safari".to_string()),
        ..SongMetadata::default()
    };
    write_tagged_wav(&inbox.join("01 - Air - La Femme d'Argent.wav"), 1, &partial);
    write_tagged_wav(&inbox.join("02 - Air - Sexy Boy.wav"), 2, &partial);
    std::fs::write(inbox.join("cover.jpg"), b"jpeg").unwrap();

    let queue = Queue::start(QueueConfig::default());
    FollowUps::install(&queue, factory.clone(), FollowUpPolicy::default());
    let mut events = queue.subscribe();

    let sources = collect_audio_files(&[inbox.clone()]);
    assert_eq!(sources.len(), 2);
    let import = queue.add(Box::new(factory.import(sources))).unwrap();

    assert_eq!(import.wait().await.status, TaskStatus::Succeeded);
    queue.wait_idle().await;

    let mut finished = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let QueueEvent::TaskFinished(report) = event {
            finished.push((report.kind, report.status));
        }
    }
    assert_eq!(
        finished,
        vec![
            (TaskKind::Import, TaskStatus::Succeeded),
            (TaskKind::Identify, TaskStatus::Succeeded),
            (TaskKind::Sort, TaskStatus::Succeeded),
        ]
    );

    let album_dir = library.root().join("Air").join("Moon Safari");
    let first = album_dir.join("01 - La Femme d'Argent.wav");
    let second = album_dir.join("02 - Sexy Boy.wav");
    assert!(first.exists());
    assert!(second.exists());
    assert!(!inbox.join("02 - Air - Sexy Boy.wav").exists());
    assert!(inbox.join("cover.jpg").exists());

    let song = library.read_song(&first).await.unwrap();
    assert_eq!(song.metadata.artist.as_deref(), Some("Air"));
    assert_eq!(song.metadata.title.as_deref(), Some("La Femme d'Argent"));
    assert_eq!(song.metadata.track_number, Some(1));

    queue.shutdown().await;
}

#[tokio::test]
async fn test_reimport_keeps_both_copies() {
    let dir = TempDir::new().unwrap();
    let (library, factory) = wire(&dir, ImportAction::Copy);
    let source = write_tagged_wav(
        &dir.path().join("inbox/song.wav"),
        1,
        &album("Air", "Talkie Walkie", "Cherry Blossom Girl", 2),
    );

    let queue = Queue::start(QueueConfig::default());
    let first = queue.add(Box::new(factory.import(vec![source.clone()]))).unwrap();
    first.wait().await;
    let second = queue.add(Box::new(factory.import(vec![source.clone()]))).unwrap();
    second.wait().await;
    queue.wait_idle().await;

    assert!(source.exists());
    assert!(library.root().join("song.wav").exists());
    assert!(library.root().join("song-1.wav").exists());

    // Same content lands on the same target, so the sort drops the duplicate
    let sort = queue.add(Box::new(factory.sort(SortScope::Library))).unwrap();
    let snapshot = sort.wait().await;
    assert_eq!(snapshot.status, TaskStatus::Succeeded);

    let songs = library.all_songs().await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(
        songs[0].path,
        library
            .root()
            .join("Air/Talkie Walkie/02 - Cherry Blossom Girl.wav")
    );

    queue.shutdown().await;
}
