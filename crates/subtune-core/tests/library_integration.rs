//! Integration tests for mirroring downloads into the in-memory library index.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use subtune_core::{
    ArtOutcome, DownloadedFile, LibraryMirror, MemoryCatalog, MemoryLibraryIndex, Track,
};
use tempfile::TempDir;

fn track(id: i64, title: &str, album: &str) -> Track {
    Track {
        artist: Some("Broadcast".to_string()),
        album: Some(album.to_string()),
        content_type: Some("audio/mpeg".to_string()),
        cover_art: Some(format!("art-{album}")),
        ..Track::new(id, title)
    }
}

fn setup() -> (
    TempDir,
    Arc<MemoryCatalog>,
    LibraryMirror<Arc<MemoryLibraryIndex>, Arc<MemoryCatalog>>,
) {
    let dir = TempDir::new().expect("temp dir");
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.add_cover_art("art-Haha Sound", vec![0xFF, 0xD8, 0x01]);
    let mirror = LibraryMirror::new(Arc::new(MemoryLibraryIndex::new()), Arc::clone(&catalog));
    (dir, catalog, mirror)
}

fn download(dir: &Path, track: Track, file_name: &str) -> DownloadedFile {
    DownloadedFile::new(track, dir.join(file_name))
}

#[test]
fn test_mirroring_twice_leaves_one_entry() {
    let (dir, _catalog, mirror) = setup();
    let file = download(dir.path(), track(1, "Pendulum", "Haha Sound"), "01.mp3");

    let first = mirror.mirror(&file).unwrap();
    let second = mirror.mirror(&file).unwrap();

    assert_eq!(first.replaced, 0);
    assert_eq!(second.replaced, 1);
    assert_eq!(mirror.index().entries_for_path(&file.path).len(), 1);
}

#[test]
fn test_titles_differing_by_case_collide() {
    let (dir, _catalog, mirror) = setup();
    let lower = download(dir.path(), track(1, "pendulum", "Haha Sound"), "01.mp3");
    let upper = download(dir.path(), track(1, "PENDULUM", "Haha Sound"), "01.mp3");

    mirror.mirror(&lower).unwrap();
    mirror.mirror(&upper).unwrap();

    let entries = mirror.index().entries_for_path(&upper.path);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "PENDULUM");
}

#[test]
fn test_album_art_registered_once_per_album() {
    let (dir, catalog, mirror) = setup();
    let first = download(dir.path(), track(1, "Pendulum", "Haha Sound"), "01.mp3");
    let second = download(dir.path(), track(2, "Winter Now", "Haha Sound"), "02.mp3");

    let outcome = mirror.mirror(&first).unwrap();
    let art_path = dir.path().join("folder.jpeg");
    assert_eq!(outcome.art, ArtOutcome::Registered(art_path.clone()));
    assert_eq!(fs::read(&art_path).unwrap(), vec![0xFF, 0xD8, 0x01]);

    let outcome = mirror.mirror(&second).unwrap();
    assert_eq!(outcome.art, ArtOutcome::AlreadyPresent);
    assert_eq!(catalog.art_fetch_count(), 1);
    assert_eq!(mirror.index().art_count(), 1);
}

#[test]
fn test_failed_art_fetch_leaves_album_without_art() {
    let (dir, catalog, mirror) = setup();
    let file = download(dir.path(), track(3, "Colour Me In", "Tender Buttons"), "01.mp3");

    let outcome = mirror.mirror(&file).unwrap();
    assert!(matches!(outcome.art, ArtOutcome::Failed(_)));
    assert!(!dir.path().join("folder.jpeg").exists());
    assert_eq!(mirror.index().art_count(), 0);
    assert_eq!(mirror.index().entries_for_path(&file.path).len(), 1);

    // A later mirror of the same album retries.
    catalog.add_cover_art("art-Tender Buttons", vec![7]);
    let outcome = mirror.mirror(&file).unwrap();
    assert!(matches!(outcome.art, ArtOutcome::Registered(_)));
}

#[test]
fn test_unmirror_keeps_album_art() {
    let (dir, _catalog, mirror) = setup();
    let file = download(dir.path(), track(1, "Pendulum", "Haha Sound"), "01.mp3");

    let outcome = mirror.mirror(&file).unwrap();
    let album = outcome.album.expect("album assigned");

    assert_eq!(mirror.unmirror(&file).unwrap(), 1);
    assert!(mirror.index().entries().is_empty());
    assert!(mirror.index().art_for(album).is_some());
    assert_eq!(mirror.unmirror(&file).unwrap(), 0);
}

#[test]
fn test_existing_art_file_is_kept_and_registered() {
    let (dir, catalog, mirror) = setup();
    let art_path = dir.path().join("folder.jpeg");
    fs::write(&art_path, "user cover").unwrap();
    let file = download(dir.path(), track(1, "Pendulum", "Haha Sound"), "01.mp3");

    let outcome = mirror.mirror(&file).unwrap();
    assert_eq!(outcome.art, ArtOutcome::Registered(art_path.clone()));
    assert_eq!(catalog.art_fetch_count(), 0);
    assert_eq!(fs::read_to_string(&art_path).unwrap(), "user cover");
}

#[test]
fn test_albums_sharing_a_directory_share_the_first_image() {
    let (dir, catalog, mirror) = setup();
    catalog.add_cover_art("art-Tender Buttons", vec![7]);
    let first = download(dir.path(), track(1, "Pendulum", "Haha Sound"), "01.mp3");
    let second = download(
        dir.path(),
        track(2, "Tears in the Typing Pool", "Tender Buttons"),
        "02.mp3",
    );

    mirror.mirror(&first).unwrap();
    let outcome = mirror.mirror(&second).unwrap();

    let art_path = dir.path().join("folder.jpeg");
    assert_eq!(outcome.art, ArtOutcome::Registered(art_path.clone()));
    assert_eq!(catalog.art_fetch_count(), 1);
    assert_eq!(fs::read(&art_path).unwrap(), vec![0xFF, 0xD8, 0x01]);
    assert_eq!(mirror.index().art_count(), 2);
}
