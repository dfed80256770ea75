//! In-memory collaborators.
//!
//! Thread-safe implementations of every collaborator trait, backed by maps
//! behind `RwLock`s. Useful for tests, demos and prototypes that embed the
//! editor or the mirror without a database or a platform media index.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
    AlbumArt, AlbumId, FavoriteMark, IndexEntryId, LibraryIndexEntry, NewPlaylist, Playlist,
    PlaylistId, Track, TrackId,
};
use crate::store::{Catalog, FavoriteStore, LibraryIndex, PlaylistStore};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog holding tracks and cover art images in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tracks: RwLock<HashMap<TrackId, Track>>,
    cover_art: RwLock<HashMap<String, Vec<u8>>>,
    art_fetches: AtomicUsize,
}

impl MemoryCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a track.
    pub fn add_track(&self, track: Track) {
        write(&self.tracks).insert(track.id, track);
    }

    /// Remove a track, making its id unresolvable.
    pub fn remove_track(&self, id: TrackId) -> Option<Track> {
        write(&self.tracks).remove(&id)
    }

    /// Add cover art bytes under a reference.
    pub fn add_cover_art(&self, reference: impl Into<String>, bytes: Vec<u8>) {
        write(&self.cover_art).insert(reference.into(), bytes);
    }

    /// Number of cover art fetches served or attempted so far.
    pub fn art_fetch_count(&self) -> usize {
        self.art_fetches.load(Ordering::SeqCst)
    }
}

impl Catalog for MemoryCatalog {
    fn resolve_track(&self, id: TrackId) -> Result<Option<Track>> {
        Ok(read(&self.tracks).get(&id).cloned())
    }

    fn fetch_cover_art(&self, cover_art: &str, _size: u32) -> Result<Vec<u8>> {
        self.art_fetches.fetch_add(1, Ordering::SeqCst);
        read(&self.cover_art)
            .get(cover_art)
            .cloned()
            .ok_or_else(|| Error::store(format!("Cover art not found: {cover_art}")))
    }
}

// =============================================================================
// Playlists
// =============================================================================

#[derive(Debug, Default)]
struct PlaylistTable {
    next_id: i64,
    rows: BTreeMap<PlaylistId, (Playlist, Vec<TrackId>)>,
}

/// Playlist store keeping playlists and sequences in memory.
///
/// A playlist is readable by its owner and, when shared, by everyone.
/// Only the owner may write it.
#[derive(Debug, Default)]
pub struct MemoryPlaylistStore {
    table: RwLock<PlaylistTable>,
}

impl MemoryPlaylistStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored playlists.
    pub fn len(&self) -> usize {
        read(&self.table).rows.len()
    }

    /// Whether the store holds no playlists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered(&self, keep: impl Fn(&Playlist) -> bool) -> Vec<Playlist> {
        read(&self.table)
            .rows
            .values()
            .map(|(playlist, _)| playlist)
            .filter(|playlist| keep(playlist))
            .cloned()
            .collect()
    }
}

impl PlaylistStore for MemoryPlaylistStore {
    fn get(&self, id: PlaylistId) -> Result<Playlist> {
        read(&self.table)
            .rows
            .get(&id)
            .map(|(playlist, _)| playlist.clone())
            .ok_or_else(|| Error::playlist_not_found(id))
    }

    fn sequence(&self, id: PlaylistId) -> Result<Vec<TrackId>> {
        read(&self.table)
            .rows
            .get(&id)
            .map(|(_, tracks)| tracks.clone())
            .ok_or_else(|| Error::playlist_not_found(id))
    }

    fn set_sequence(&self, id: PlaylistId, tracks: &[TrackId]) -> Result<()> {
        let mut table = write(&self.table);
        let (playlist, sequence) = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| Error::playlist_not_found(id))?;
        *sequence = tracks.to_vec();
        playlist.changed = Utc::now();
        Ok(())
    }

    fn create(&self, playlist: &NewPlaylist) -> Result<PlaylistId> {
        let mut table = write(&self.table);
        table.next_id += 1;
        let id = PlaylistId(table.next_id);
        table
            .rows
            .insert(id, (playlist.clone().with_id(id), Vec::new()));
        debug!("Stored playlist {} in memory", id);
        Ok(id)
    }

    fn update(&self, playlist: &Playlist) -> Result<()> {
        let mut table = write(&self.table);
        let (stored, _) = table
            .rows
            .get_mut(&playlist.id)
            .ok_or_else(|| Error::playlist_not_found(playlist.id))?;
        *stored = playlist.clone();
        Ok(())
    }

    fn delete(&self, id: PlaylistId) -> Result<()> {
        write(&self.table).rows.remove(&id);
        Ok(())
    }

    fn readable_for(&self, username: &str) -> Result<Vec<Playlist>> {
        Ok(self.filtered(|p| p.owner == username || p.shared))
    }

    fn writable_for(&self, username: &str) -> Result<Vec<Playlist>> {
        Ok(self.filtered(|p| p.owner == username))
    }
}

// =============================================================================
// Favorites
// =============================================================================

/// Favorite store keeping stars in insertion order.
#[derive(Debug, Default)]
pub struct MemoryFavoriteStore {
    marks: RwLock<Vec<FavoriteMark>>,
}

impl MemoryFavoriteStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Star a track at an explicit instant.
    pub fn star_at(&self, track: TrackId, username: &str, at: DateTime<Utc>) {
        let mut marks = write(&self.marks);
        if !marks
            .iter()
            .any(|m| m.track_id == track && m.username == username)
        {
            marks.push(FavoriteMark {
                track_id: track,
                username: username.to_string(),
                starred_at: Some(at),
            });
        }
    }
}

impl FavoriteStore for MemoryFavoriteStore {
    fn starred_at(&self, track: TrackId, username: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(read(&self.marks)
            .iter()
            .find(|m| m.track_id == track && m.username == username)
            .and_then(|m| m.starred_at))
    }

    fn star(&self, track: TrackId, username: &str) -> Result<()> {
        self.star_at(track, username, Utc::now());
        Ok(())
    }

    fn unstar(&self, track: TrackId, username: &str) -> Result<()> {
        write(&self.marks).retain(|m| !(m.track_id == track && m.username == username));
        Ok(())
    }

    fn starred_tracks(&self, username: &str) -> Result<Vec<TrackId>> {
        Ok(read(&self.marks)
            .iter()
            .rev()
            .filter(|m| m.username == username && m.is_starred())
            .map(|m| m.track_id)
            .collect())
    }
}

// =============================================================================
// Library index
// =============================================================================

#[derive(Debug, Default)]
struct IndexTable {
    next_entry: i64,
    next_album: i64,
    entries: BTreeMap<IndexEntryId, (LibraryIndexEntry, Option<AlbumId>)>,
    albums: HashMap<String, AlbumId>,
    art: HashMap<AlbumId, AlbumArt>,
}

/// Library index grouping entries into albums by album name.
#[derive(Debug, Default)]
pub struct MemoryLibraryIndex {
    table: RwLock<IndexTable>,
}

impl MemoryLibraryIndex {
    /// Empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> Vec<LibraryIndexEntry> {
        read(&self.table)
            .entries
            .values()
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    /// Entries whose path equals `path`.
    pub fn entries_for_path(&self, path: &Path) -> Vec<LibraryIndexEntry> {
        read(&self.table)
            .entries
            .values()
            .filter(|(entry, _)| entry.path == path)
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    /// Art registered for an album.
    pub fn art_for(&self, album: AlbumId) -> Option<AlbumArt> {
        read(&self.table).art.get(&album).cloned()
    }

    /// Number of albums with registered art.
    pub fn art_count(&self) -> usize {
        read(&self.table).art.len()
    }
}

impl LibraryIndex for MemoryLibraryIndex {
    fn delete_by_title_key_and_path(&self, title_key: &str, path: &Path) -> Result<usize> {
        let mut table = write(&self.table);
        let before = table.entries.len();
        table
            .entries
            .retain(|_, (entry, _)| !(entry.title_key == title_key && entry.path == path));
        Ok(before - table.entries.len())
    }

    fn insert(&self, entry: &LibraryIndexEntry) -> Result<IndexEntryId> {
        let mut table = write(&self.table);
        table.next_entry += 1;
        let id = IndexEntryId(table.next_entry);

        let album = match entry.album.as_deref() {
            Some(name) => {
                let key = name.to_lowercase();
                if let Some(&album) = table.albums.get(&key) {
                    Some(album)
                } else {
                    table.next_album += 1;
                    let album = AlbumId(table.next_album);
                    table.albums.insert(key, album);
                    Some(album)
                }
            }
            None => None,
        };

        table.entries.insert(id, (entry.clone(), album));
        Ok(id)
    }

    fn album_id_for(&self, entry: IndexEntryId) -> Result<Option<AlbumId>> {
        Ok(read(&self.table)
            .entries
            .get(&entry)
            .and_then(|(_, album)| *album))
    }

    fn has_art(&self, album: AlbumId) -> Result<bool> {
        Ok(read(&self.table).art.contains_key(&album))
    }

    fn register_art(&self, album: AlbumId, path: &Path) -> Result<()> {
        // First registration wins.
        write(&self.table)
            .art
            .entry(album)
            .or_insert_with(|| AlbumArt {
                album,
                path: path.to_path_buf(),
            });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn entry(title: &str, album: Option<&str>, path: &str) -> LibraryIndexEntry {
        LibraryIndexEntry {
            title: title.to_string(),
            title_key: title.to_lowercase(),
            artist: None,
            album: album.map(str::to_string),
            track_number: None,
            year: None,
            path: PathBuf::from(path),
            content_type: None,
            is_music: true,
        }
    }

    #[test]
    fn test_catalog_resolves_and_counts_fetches() {
        let catalog = MemoryCatalog::new();
        catalog.add_track(Track::new(TrackId(1), "One"));
        catalog.add_cover_art("c1", vec![1]);

        assert!(catalog.resolve_track(TrackId(1)).unwrap().is_some());
        assert!(catalog.resolve_track(TrackId(2)).unwrap().is_none());
        assert_eq!(catalog.fetch_cover_art("c1", 320).unwrap(), vec![1]);
        assert!(catalog.fetch_cover_art("missing", 320).is_err());
        assert_eq!(catalog.art_fetch_count(), 2);
    }

    #[test]
    fn test_playlist_store_assigns_ids_and_visibility() {
        let store = MemoryPlaylistStore::new();
        let now = Utc::now();
        let private = store.create(&NewPlaylist::private("alice", "a", now)).unwrap();
        let mut shared = NewPlaylist::private("bob", "b", now);
        shared.shared = true;
        let shared = store.create(&shared).unwrap();

        assert_ne!(private, shared);
        assert_eq!(store.len(), 2);
        assert_eq!(store.readable_for("alice").unwrap().len(), 2);
        assert_eq!(store.writable_for("alice").unwrap().len(), 1);
        assert_eq!(store.readable_for("carol").unwrap().len(), 1);
    }

    #[test]
    fn test_playlist_store_missing_playlist() {
        let store = MemoryPlaylistStore::new();
        let err = store.sequence(PlaylistId(99)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(store.set_sequence(PlaylistId(99), &[]).is_err());
        assert!(store.delete(PlaylistId(99)).is_ok());
    }

    #[test]
    fn test_favorites_most_recent_first() {
        let favorites = MemoryFavoriteStore::new();
        favorites.star(TrackId(1), "alice").unwrap();
        favorites.star(TrackId(2), "alice").unwrap();
        favorites.star(TrackId(3), "bob").unwrap();
        favorites.star(TrackId(1), "alice").unwrap();

        assert_eq!(
            favorites.starred_tracks("alice").unwrap(),
            vec![TrackId(2), TrackId(1)]
        );
        favorites.unstar(TrackId(2), "alice").unwrap();
        assert!(favorites.starred_at(TrackId(2), "alice").unwrap().is_none());
        assert!(favorites.starred_at(TrackId(3), "bob").unwrap().is_some());
    }

    #[test]
    fn test_index_groups_albums_and_keeps_first_art() {
        let index = MemoryLibraryIndex::new();
        let a = index.insert(&entry("a", Some("Album"), "/m/a.mp3")).unwrap();
        let b = index.insert(&entry("b", Some("album"), "/m/b.mp3")).unwrap();
        let c = index.insert(&entry("c", None, "/m/c.mp3")).unwrap();

        let album = index.album_id_for(a).unwrap().unwrap();
        assert_eq!(index.album_id_for(b).unwrap(), Some(album));
        assert_eq!(index.album_id_for(c).unwrap(), None);

        index.register_art(album, Path::new("/m/folder.jpeg")).unwrap();
        index.register_art(album, Path::new("/other/folder.jpeg")).unwrap();
        assert_eq!(
            index.art_for(album).map(|art| art.path),
            Some(PathBuf::from("/m/folder.jpeg"))
        );
        assert!(index.has_art(album).unwrap());
    }

    #[test]
    fn test_index_delete_matches_key_and_path() {
        let index = MemoryLibraryIndex::new();
        index.insert(&entry("a", None, "/m/a.mp3")).unwrap();
        index.insert(&entry("a", None, "/m/other.mp3")).unwrap();

        let removed = index
            .delete_by_title_key_and_path("a", Path::new("/m/a.mp3"))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(index.entries().len(), 1);
        assert!(index.entries_for_path(Path::new("/m/a.mp3")).is_empty());
    }
}
