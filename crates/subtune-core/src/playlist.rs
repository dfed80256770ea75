//! Playlist editing.
//!
//! [`PlaylistEditor`] exposes position-based edits on a playlist's ordered
//! track sequence. Every edit reads the full current sequence from the
//! [`PlaylistStore`], applies the change in memory and writes the full
//! sequence back. There are no partial updates and no locking: two callers
//! editing the same playlist concurrently resolve as last writer wins.
//!
//! Views returned to callers are annotated with the acting user's stars,
//! computed fresh from the [`FavoriteStore`] on every read.
//!
//! # Example
//!
//! ```rust,ignore
//! use subtune_core::playlist::PlaylistEditor;
//!
//! let editor = PlaylistEditor::new(store, favorites, catalog);
//! let playlist = editor.create_empty("alice")?;
//! editor.append(playlist.id, &[TrackId(1), TrackId(2)])?;
//! let view = editor.move_down(playlist.id, 0, "alice")?;
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::PlaylistConfig;
use crate::error::Result;
use crate::model::{NewPlaylist, Playlist, PlaylistEntry, PlaylistId, PlaylistView, TrackId};
use crate::naming::PlaylistNamer;
use crate::sequence;
use crate::store::{Catalog, FavoriteStore, PlaylistStore};

/// Position-based playlist editor over injected collaborators.
pub struct PlaylistEditor<P, F, C> {
    playlists: P,
    favorites: F,
    catalog: C,
    namer: Box<dyn PlaylistNamer>,
    starred_namer: Box<dyn PlaylistNamer>,
}

impl<P, F, C> PlaylistEditor<P, F, C>
where
    P: PlaylistStore,
    F: FavoriteStore,
    C: Catalog,
{
    /// Create an editor with the default naming strategies.
    pub fn new(playlists: P, favorites: F, catalog: C) -> Self {
        let config = PlaylistConfig::default();
        Self::build(playlists, favorites, catalog, &config)
    }

    /// Create an editor whose naming strategies follow `config`.
    pub fn with_config(
        playlists: P,
        favorites: F,
        catalog: C,
        config: &PlaylistConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(playlists, favorites, catalog, config))
    }

    fn build(playlists: P, favorites: F, catalog: C, config: &PlaylistConfig) -> Self {
        Self {
            playlists,
            favorites,
            catalog,
            namer: Box::new(config.namer()),
            starred_namer: Box::new(config.starred_namer()),
        }
    }

    /// Replace the naming strategy for new playlists.
    #[must_use]
    pub fn with_namer(mut self, namer: impl PlaylistNamer + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    /// Replace the naming strategy for playlists of starred tracks.
    #[must_use]
    pub fn with_starred_namer(mut self, namer: impl PlaylistNamer + 'static) -> Self {
        self.starred_namer = Box::new(namer);
        self
    }

    /// The playlist store.
    pub const fn store(&self) -> &P {
        &self.playlists
    }

    /// The favorite store.
    pub const fn favorites(&self) -> &F {
        &self.favorites
    }

    /// The catalog.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Playlists `username` may read.
    pub fn readable_playlists(&self, username: &str) -> Result<Vec<Playlist>> {
        self.playlists.readable_for(username)
    }

    /// Playlists `username` may modify.
    pub fn writable_playlists(&self, username: &str) -> Result<Vec<Playlist>> {
        self.playlists.writable_for(username)
    }

    /// A playlist with one entry per position, starred flags for `username`.
    ///
    /// Positions whose track no longer resolves are kept, without metadata,
    /// so view indices always match edit indices.
    pub fn view(&self, id: PlaylistId, username: &str) -> Result<PlaylistView> {
        let playlist = self.playlists.get(id)?;
        let track_ids = self.playlists.sequence(id)?;

        let mut entries = Vec::with_capacity(track_ids.len());
        for track_id in track_ids {
            let starred = self.favorites.starred_at(track_id, username)?.is_some();
            let entry = match self.catalog.resolve_track(track_id)? {
                Some(track) => PlaylistEntry::from_track(&track, starred),
                None => PlaylistEntry::unresolved(track_id, starred),
            };
            entries.push(entry);
        }

        Ok(PlaylistView { playlist, entries })
    }

    /// Create an empty private playlist with a generated name.
    pub fn create_empty(&self, owner: &str) -> Result<Playlist> {
        self.create_empty_at(owner, Utc::now())
    }

    /// [`Self::create_empty`] at an explicit instant.
    pub fn create_empty_at(&self, owner: &str, now: DateTime<Utc>) -> Result<Playlist> {
        let name = self.namer.name(now);
        self.persist(NewPlaylist::private(owner, name, now), &[])
    }

    /// Create a private playlist prefilled with `track_ids`.
    ///
    /// Ids the catalog cannot resolve are skipped. `name` falls back to the
    /// generated name.
    pub fn create_from_track_set(
        &self,
        owner: &str,
        name: Option<&str>,
        track_ids: &[TrackId],
    ) -> Result<Playlist> {
        self.create_from_track_set_at(owner, name, track_ids, Utc::now())
    }

    /// [`Self::create_from_track_set`] at an explicit instant.
    pub fn create_from_track_set_at(
        &self,
        owner: &str,
        name: Option<&str>,
        track_ids: &[TrackId],
        now: DateTime<Utc>,
    ) -> Result<Playlist> {
        let name = name.map_or_else(|| self.namer.name(now), str::to_string);
        let tracks = self.resolvable(track_ids)?;
        self.persist(NewPlaylist::private(owner, name, now), &tracks)
    }

    /// Create a private playlist holding every track `owner` has starred.
    pub fn create_for_starred(&self, owner: &str) -> Result<Playlist> {
        self.create_for_starred_at(owner, Utc::now())
    }

    /// [`Self::create_for_starred`] at an explicit instant.
    pub fn create_for_starred_at(&self, owner: &str, now: DateTime<Utc>) -> Result<Playlist> {
        let name = self.starred_namer.name(now);
        let tracks = self.favorites.starred_tracks(owner)?;
        self.persist(NewPlaylist::private(owner, name, now), &tracks)
    }

    /// Append tracks in input order. Unresolvable ids are skipped.
    ///
    /// Returns how many tracks were appended.
    pub fn append(&self, id: PlaylistId, track_ids: &[TrackId]) -> Result<usize> {
        let mut tracks = self.playlists.sequence(id)?;
        let added = self.resolvable(track_ids)?;
        let count = added.len();
        tracks.extend(added);
        self.playlists.set_sequence(id, &tracks)?;
        debug!(
            "Appended {} of {} tracks to playlist {}",
            count,
            track_ids.len(),
            id
        );
        Ok(count)
    }

    /// Remove the entry at `index`, shifting later entries left.
    pub fn remove_at(&self, id: PlaylistId, index: i64, username: &str) -> Result<PlaylistView> {
        let mut tracks = self.playlists.sequence(id)?;
        let removed = sequence::remove_at(&mut tracks, index)?;
        self.playlists.set_sequence(id, &tracks)?;
        debug!("Removed track {} at {} from playlist {}", removed, index, id);
        self.view(id, username)
    }

    /// Swap the entry at `index` with the one before it. No-op at 0.
    pub fn move_up(&self, id: PlaylistId, index: i64, username: &str) -> Result<PlaylistView> {
        let mut tracks = self.playlists.sequence(id)?;
        if sequence::move_up(&mut tracks, index)? {
            self.playlists.set_sequence(id, &tracks)?;
            debug!("Moved entry {} up in playlist {}", index, id);
        }
        self.view(id, username)
    }

    /// Swap the entry at `index` with the one after it. No-op at the end.
    pub fn move_down(&self, id: PlaylistId, index: i64, username: &str) -> Result<PlaylistView> {
        let mut tracks = self.playlists.sequence(id)?;
        if sequence::move_down(&mut tracks, index)? {
            self.playlists.set_sequence(id, &tracks)?;
            debug!("Moved entry {} down in playlist {}", index, id);
        }
        self.view(id, username)
    }

    /// Flip `username`'s star on the track at `index`.
    pub fn toggle_favorite(
        &self,
        id: PlaylistId,
        index: i64,
        username: &str,
    ) -> Result<PlaylistView> {
        let tracks = self.playlists.sequence(id)?;
        let track = tracks[sequence::checked_index(index, tracks.len())?];

        if self.favorites.starred_at(track, username)?.is_some() {
            self.favorites.unstar(track, username)?;
            debug!("{} unstarred track {}", username, track);
        } else {
            self.favorites.star(track, username)?;
            debug!("{} starred track {}", username, track);
        }
        self.view(id, username)
    }

    /// Update name, comment and sharing. The sequence is untouched.
    pub fn rename(
        &self,
        id: PlaylistId,
        name: &str,
        comment: Option<&str>,
        shared: bool,
        username: &str,
    ) -> Result<PlaylistView> {
        let mut playlist = self.playlists.get(id)?;
        playlist.name = name.to_string();
        playlist.comment = comment.map(str::to_string);
        playlist.shared = shared;
        playlist.changed = Utc::now();
        self.playlists.update(&playlist)?;
        info!("Updated playlist {} ({})", id, playlist.name);
        self.view(id, username)
    }

    /// Remove a playlist and its sequence.
    pub fn delete(&self, id: PlaylistId) -> Result<()> {
        self.playlists.delete(id)?;
        info!("Deleted playlist {}", id);
        Ok(())
    }

    fn resolvable(&self, track_ids: &[TrackId]) -> Result<Vec<TrackId>> {
        let mut resolved = Vec::with_capacity(track_ids.len());
        for &track_id in track_ids {
            match self.catalog.resolve_track(track_id)? {
                Some(track) => resolved.push(track.id),
                None => debug!("Skipping unresolvable track {}", track_id),
            }
        }
        Ok(resolved)
    }

    fn persist(&self, playlist: NewPlaylist, tracks: &[TrackId]) -> Result<Playlist> {
        let id = self.playlists.create(&playlist)?;
        if !tracks.is_empty() {
            self.playlists.set_sequence(id, tracks)?;
        }
        info!(
            "Created playlist {} ({}) for {} with {} tracks",
            id,
            playlist.name,
            playlist.owner,
            tracks.len()
        );
        Ok(playlist.with_id(id))
    }
}
