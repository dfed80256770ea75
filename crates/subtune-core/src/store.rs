//! Collaborator interfaces consumed by the editor and the mirror.
//!
//! Persistence, catalog lookups and the platform media index live outside
//! this crate. Each is reached through one of the traits below, passed in at
//! construction time. Failures reported by a collaborator are propagated to
//! the caller unchanged.
//!
//! Each trait is also implemented for `Arc<T>`, so one collaborator can be
//! shared between a [`crate::playlist::PlaylistEditor`] and a
//! [`crate::library::LibraryMirror`].

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    AlbumId, IndexEntryId, LibraryIndexEntry, NewPlaylist, Playlist, PlaylistId, Track, TrackId,
};

/// Read access to the track catalog.
#[cfg_attr(test, mockall::automock)]
pub trait Catalog: Send + Sync {
    /// Look up a track. `Ok(None)` when the id is unknown.
    fn resolve_track(&self, id: TrackId) -> Result<Option<Track>>;

    /// Fetch cover art bytes scaled to `size` pixels.
    fn fetch_cover_art(&self, cover_art: &str, size: u32) -> Result<Vec<u8>>;
}

/// Persistence for playlists and their ordered sequences.
#[cfg_attr(test, mockall::automock)]
pub trait PlaylistStore: Send + Sync {
    /// Playlist metadata.
    fn get(&self, id: PlaylistId) -> Result<Playlist>;

    /// Track ids in playlist order.
    fn sequence(&self, id: PlaylistId) -> Result<Vec<TrackId>>;

    /// Replace the whole sequence.
    fn set_sequence(&self, id: PlaylistId, tracks: &[TrackId]) -> Result<()>;

    /// Persist a new playlist and return its assigned identity.
    fn create(&self, playlist: &NewPlaylist) -> Result<PlaylistId>;

    /// Overwrite playlist metadata.
    fn update(&self, playlist: &Playlist) -> Result<()>;

    /// Remove a playlist and its sequence.
    fn delete(&self, id: PlaylistId) -> Result<()>;

    /// Playlists the user may read.
    fn readable_for(&self, username: &str) -> Result<Vec<Playlist>>;

    /// Playlists the user may modify.
    fn writable_for(&self, username: &str) -> Result<Vec<Playlist>>;
}

/// Per-user track stars.
#[cfg_attr(test, mockall::automock)]
pub trait FavoriteStore: Send + Sync {
    /// When the user starred the track, if they did.
    fn starred_at(&self, track: TrackId, username: &str) -> Result<Option<DateTime<Utc>>>;

    /// Star a track.
    fn star(&self, track: TrackId, username: &str) -> Result<()>;

    /// Remove a star.
    fn unstar(&self, track: TrackId, username: &str) -> Result<()>;

    /// All tracks the user has starred, most recent first.
    fn starred_tracks(&self, username: &str) -> Result<Vec<TrackId>>;
}

/// The platform media index that downloads are mirrored into.
#[cfg_attr(test, mockall::automock)]
pub trait LibraryIndex: Send + Sync {
    /// Delete entries matching both the title key and the path. Returns the
    /// number of rows removed.
    fn delete_by_title_key_and_path(&self, title_key: &str, path: &Path) -> Result<usize>;

    /// Insert an entry and return its identity.
    fn insert(&self, entry: &LibraryIndexEntry) -> Result<IndexEntryId>;

    /// Album grouping the index assigned to an entry.
    fn album_id_for(&self, entry: IndexEntryId) -> Result<Option<AlbumId>>;

    /// Whether the album already has cached art.
    fn has_art(&self, album: AlbumId) -> Result<bool>;

    /// Record the cached art file for an album.
    fn register_art(&self, album: AlbumId, path: &Path) -> Result<()>;
}

impl<T: Catalog + ?Sized> Catalog for Arc<T> {
    fn resolve_track(&self, id: TrackId) -> Result<Option<Track>> {
        (**self).resolve_track(id)
    }

    fn fetch_cover_art(&self, cover_art: &str, size: u32) -> Result<Vec<u8>> {
        (**self).fetch_cover_art(cover_art, size)
    }
}

impl<T: PlaylistStore + ?Sized> PlaylistStore for Arc<T> {
    fn get(&self, id: PlaylistId) -> Result<Playlist> {
        (**self).get(id)
    }

    fn sequence(&self, id: PlaylistId) -> Result<Vec<TrackId>> {
        (**self).sequence(id)
    }

    fn set_sequence(&self, id: PlaylistId, tracks: &[TrackId]) -> Result<()> {
        (**self).set_sequence(id, tracks)
    }

    fn create(&self, playlist: &NewPlaylist) -> Result<PlaylistId> {
        (**self).create(playlist)
    }

    fn update(&self, playlist: &Playlist) -> Result<()> {
        (**self).update(playlist)
    }

    fn delete(&self, id: PlaylistId) -> Result<()> {
        (**self).delete(id)
    }

    fn readable_for(&self, username: &str) -> Result<Vec<Playlist>> {
        (**self).readable_for(username)
    }

    fn writable_for(&self, username: &str) -> Result<Vec<Playlist>> {
        (**self).writable_for(username)
    }
}

impl<T: FavoriteStore + ?Sized> FavoriteStore for Arc<T> {
    fn starred_at(&self, track: TrackId, username: &str) -> Result<Option<DateTime<Utc>>> {
        (**self).starred_at(track, username)
    }

    fn star(&self, track: TrackId, username: &str) -> Result<()> {
        (**self).star(track, username)
    }

    fn unstar(&self, track: TrackId, username: &str) -> Result<()> {
        (**self).unstar(track, username)
    }

    fn starred_tracks(&self, username: &str) -> Result<Vec<TrackId>> {
        (**self).starred_tracks(username)
    }
}

impl<T: LibraryIndex + ?Sized> LibraryIndex for Arc<T> {
    fn delete_by_title_key_and_path(&self, title_key: &str, path: &Path) -> Result<usize> {
        (**self).delete_by_title_key_and_path(title_key, path)
    }

    fn insert(&self, entry: &LibraryIndexEntry) -> Result<IndexEntryId> {
        (**self).insert(entry)
    }

    fn album_id_for(&self, entry: IndexEntryId) -> Result<Option<AlbumId>> {
        (**self).album_id_for(entry)
    }

    fn has_art(&self, album: AlbumId) -> Result<bool> {
        (**self).has_art(album)
    }

    fn register_art(&self, album: AlbumId, path: &Path) -> Result<()> {
        (**self).register_art(album, path)
    }
}
