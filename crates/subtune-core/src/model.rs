//! Domain types shared by the playlist editor and the library mirror.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Identity of a track in the catalog.
    TrackId
);
id_type!(
    /// Identity of a playlist, assigned by the playlist store.
    PlaylistId
);
id_type!(
    /// Identity of a row in the library index, assigned on insert.
    IndexEntryId
);
id_type!(
    /// Album grouping maintained by the library index.
    AlbumId
);

/// A track as known by the catalog. Read-only from this crate's view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    /// Catalog identity.
    pub id: TrackId,
    /// Track title.
    pub title: String,
    /// Performing artist.
    pub artist: Option<String>,
    /// Album name.
    pub album: Option<String>,
    /// Release year.
    pub year: Option<i32>,
    /// Position on the album.
    pub track_number: Option<u32>,
    /// Duration in seconds.
    pub duration_secs: Option<u64>,
    /// MIME type of the audio content, e.g. `audio/mpeg`.
    pub content_type: Option<String>,
    /// Catalog reference for the cover art, if any.
    pub cover_art: Option<String>,
}

impl Track {
    /// Create a track with only an id and a title set.
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Duration formatted as `m:ss`, or `h:mm:ss` from one hour upward.
    #[must_use]
    pub fn formatted_duration(&self) -> Option<String> {
        self.duration_secs.map(format_duration)
    }
}

/// Format a duration in seconds as `m:ss` or `h:mm:ss`.
#[must_use]
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// Playlist metadata. The ordered track sequence lives in the store and is
/// read and written as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    /// Store-assigned identity.
    pub id: PlaylistId,
    /// Owner's username.
    pub owner: String,
    /// Display name.
    pub name: String,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Whether other users may read the playlist.
    pub shared: bool,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last metadata or sequence change.
    pub changed: DateTime<Utc>,
}

/// A playlist that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPlaylist {
    /// Owner's username.
    pub owner: String,
    /// Display name.
    pub name: String,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Whether other users may read the playlist.
    pub shared: bool,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last change time, equal to `created` for a new playlist.
    pub changed: DateTime<Utc>,
}

impl NewPlaylist {
    /// A private playlist created at `now`.
    pub fn private(owner: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            comment: None,
            shared: false,
            created: now,
            changed: now,
        }
    }

    /// Attach the identity assigned by the store.
    #[must_use]
    pub fn with_id(self, id: PlaylistId) -> Playlist {
        Playlist {
            id,
            owner: self.owner,
            name: self.name,
            comment: self.comment,
            shared: self.shared,
            created: self.created,
            changed: self.changed,
        }
    }
}

/// One position of a playlist as presented to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Track at this position.
    pub track_id: TrackId,
    /// Title, if the catalog still knows the track.
    pub title: Option<String>,
    /// Artist, if known.
    pub artist: Option<String>,
    /// Album, if known.
    pub album: Option<String>,
    /// Formatted duration, if known.
    pub duration: Option<String>,
    /// Whether the requesting user has starred the track.
    pub starred: bool,
}

impl PlaylistEntry {
    /// Entry for a resolved track.
    #[must_use]
    pub fn from_track(track: &Track, starred: bool) -> Self {
        Self {
            track_id: track.id,
            title: Some(track.title.clone()),
            artist: track.artist.clone(),
            album: track.album.clone(),
            duration: track.formatted_duration(),
            starred,
        }
    }

    /// Entry for a track id the catalog could not resolve.
    #[must_use]
    pub const fn unresolved(track_id: TrackId, starred: bool) -> Self {
        Self {
            track_id,
            title: None,
            artist: None,
            album: None,
            duration: None,
            starred,
        }
    }
}

/// A playlist with its entries annotated for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistView {
    /// Playlist metadata.
    pub playlist: Playlist,
    /// One entry per sequence position, in order.
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistView {
    /// Track ids in sequence order.
    #[must_use]
    pub fn track_ids(&self) -> Vec<TrackId> {
        self.entries.iter().map(|e| e.track_id).collect()
    }
}

/// A user's star on a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteMark {
    /// Starred track.
    pub track_id: TrackId,
    /// User who starred it.
    pub username: String,
    /// When the star was set; `None` means not starred.
    pub starred_at: Option<DateTime<Utc>>,
}

impl FavoriteMark {
    /// Whether the mark represents a star.
    #[must_use]
    pub const fn is_starred(&self) -> bool {
        self.starred_at.is_some()
    }
}

/// A track whose content has been fully retrieved to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Catalog metadata.
    pub track: Track,
    /// Absolute path of the completed file.
    pub path: PathBuf,
}

impl DownloadedFile {
    /// Pair a track with its local file.
    pub fn new(track: Track, path: impl Into<PathBuf>) -> Self {
        Self {
            track,
            path: path.into(),
        }
    }

    /// Directory holding the file.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// A row to insert into the library index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryIndexEntry {
    /// Raw title.
    pub title: String,
    /// Normalized title used for deduplication.
    pub title_key: String,
    /// Artist.
    pub artist: Option<String>,
    /// Album.
    pub album: Option<String>,
    /// Track number.
    pub track_number: Option<u32>,
    /// Release year.
    pub year: Option<i32>,
    /// Absolute file path.
    pub path: PathBuf,
    /// MIME type.
    pub content_type: Option<String>,
    /// Always true for mirrored downloads.
    pub is_music: bool,
}

/// Cached cover art registered for an album.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlbumArt {
    /// Album the image belongs to.
    pub album: AlbumId,
    /// Image file on disk.
    pub path: PathBuf,
}
