//! Error types for Subtune core operations.
//!
//! Errors are grouped by domain. The top-level [`Error`] wraps the domain
//! errors and adds variants for collaborator, configuration and
//! serialization failures. [`Error::kind`] gives callers a flat category
//! for programmatic handling (for instance when mapping onto an RPC reply).

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{AlbumId, PlaylistId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by playlist edits.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Position argument outside `[0, len)`.
    #[error("Index {index} out of range for playlist of length {len}")]
    IndexOutOfRange {
        /// The requested position, as received.
        index: i64,
        /// Length of the sequence at the time of the call.
        len: usize,
    },

    /// The playlist does not exist.
    #[error("Playlist not found: {id}")]
    NotFound {
        /// Identity of the missing playlist.
        id: PlaylistId,
    },
}

/// Errors raised while mirroring into the library index.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Cover art could not be fetched, written or registered.
    ///
    /// Never returned from [`crate::library::LibraryMirror::mirror`]; it is
    /// logged and the album is left without art.
    #[error("Failed to cache album art for album {album}: {reason}")]
    ArtFetchFailed {
        /// Album the art was meant for.
        album: AlbumId,
        /// Underlying failure.
        reason: String,
    },

    /// The catalog answered with an empty image.
    #[error("Cover art {cover_art} is empty")]
    EmptyArt {
        /// Catalog cover art reference.
        cover_art: String,
    },
}

/// File system failures.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path being read.
        path: PathBuf,
        /// Error message.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// Path being written.
        path: PathBuf,
        /// Error message.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory being created.
        path: PathBuf,
        /// Error message.
        reason: String,
    },
}

/// Errors that can occur in Subtune core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Playlist edit error.
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Library mirror error.
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// File system error.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// A collaborator (store, catalog, index) failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Flat error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad position argument.
    IndexOutOfRange,
    /// Referenced entity does not exist.
    NotFound,
    /// Album art could not be cached.
    ArtFetch,
    /// File system failure.
    FileSystem,
    /// Collaborator failure.
    Store,
    /// Invalid configuration.
    Configuration,
    /// Malformed data.
    Serialization,
}

impl Error {
    /// Build a collaborator failure.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Build an out-of-range position error.
    pub const fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::Playlist(PlaylistError::IndexOutOfRange { index, len })
    }

    /// Build a missing playlist error.
    pub const fn playlist_not_found(id: PlaylistId) -> Self {
        Self::Playlist(PlaylistError::NotFound { id })
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Playlist(PlaylistError::IndexOutOfRange { .. }) => ErrorKind::IndexOutOfRange,
            Self::Playlist(PlaylistError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Library(_) => ErrorKind::ArtFetch,
            Self::FileSystem(_) => ErrorKind::FileSystem,
            Self::Store(_) => ErrorKind::Store,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Whether this error was caused by the caller's arguments rather than
    /// by a failing collaborator.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::IndexOutOfRange | ErrorKind::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_range_display() {
        let err = Error::index_out_of_range(-1, 3);
        assert_eq!(
            err.to_string(),
            "Index -1 out of range for playlist of length 3"
        );
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_playlist_not_found_display() {
        let err = Error::playlist_not_found(PlaylistId(42));
        assert_eq!(err.to_string(), "Playlist not found: 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_store_error_is_not_caller_error() {
        let err = Error::store("connection reset");
        assert_eq!(err.to_string(), "Store error: connection reset");
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_file_system_error_display() {
        let err = Error::FileSystem(FileSystemError::WriteFailed {
            path: PathBuf::from("/music/album/folder.jpeg"),
            reason: "permission denied".to_string(),
        });
        assert!(err.to_string().contains("/music/album/folder.jpeg"));
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(err.kind(), ErrorKind::FileSystem);
    }

    #[test]
    fn test_art_fetch_kind() {
        let err = Error::Library(LibraryError::ArtFetchFailed {
            album: AlbumId(7),
            reason: "timeout".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::ArtFetch);
        assert!(err.to_string().contains("album 7"));
    }

    #[test]
    fn test_empty_art_kind() {
        let err = Error::Library(LibraryError::EmptyArt {
            cover_art: "al-12".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::ArtFetch);
        assert_eq!(err.to_string(), "Cover art al-12 is empty");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
