//! `Subtune` Core Library
//!
//! This crate provides the core functionality behind the `Subtune` media
//! server and its mobile client:
//! - Playlist editing over an ordered track sequence (append, remove, reorder, star)
//! - Mirroring completed downloads into a platform media index, with album art
//! - Collaborator traits for persistence, catalog and media index, plus
//!   in-memory implementations
//! - Configuration and logging setup
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`]. See the [`error`] module for
//! the error kinds.
//!
//! ```rust,ignore
//! use subtune_core::{MemoryCatalog, MemoryFavoriteStore, MemoryPlaylistStore, PlaylistEditor};
//!
//! let editor = PlaylistEditor::new(
//!     MemoryPlaylistStore::new(),
//!     MemoryFavoriteStore::new(),
//!     MemoryCatalog::new(),
//! );
//! let playlist = editor.create_empty("alice")?;
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod memory;
pub mod model;
pub mod naming;
pub mod playlist;
pub mod sequence;
pub mod store;

pub use config::{
    CoreConfig, DEFAULT_ART_FILE_NAME, DEFAULT_COVER_ART_SIZE, MirrorConfig, PlaylistConfig,
};
pub use error::{Error, ErrorKind, FileSystemError, LibraryError, PlaylistError, Result};
pub use library::{ArtOutcome, LibraryMirror, MirrorOutcome, title_key};
pub use logging::{LogRotation, LoggingConfig, LoggingError, LoggingGuard};
pub use memory::{MemoryCatalog, MemoryFavoriteStore, MemoryLibraryIndex, MemoryPlaylistStore};
pub use model::{
    AlbumArt, AlbumId, DownloadedFile, FavoriteMark, IndexEntryId, LibraryIndexEntry, NewPlaylist,
    Playlist, PlaylistEntry, PlaylistId, PlaylistView, Track, TrackId,
};
pub use naming::{DateTimeNamer, PlaylistNamer, PrefixedNamer};
pub use playlist::PlaylistEditor;
pub use store::{Catalog, FavoriteStore, LibraryIndex, PlaylistStore};
