//! Mirroring completed downloads into the platform media index.
//!
//! [`LibraryMirror::mirror`] upserts one index entry per downloaded file and,
//! the first time an album is seen without art, caches the track's cover art
//! next to the file and registers it for the album. Deduplication uses the
//! pair (title key, file path), so mirroring the same file twice leaves a
//! single entry.
//!
//! Cover art is best effort. Any failure while fetching, writing or
//! registering it is logged and the mirror still succeeds. Art is staged in
//! a temporary file and moved into place only if no file of that name
//! exists, so only a file this mirror created is ever removed. An art file
//! already present in the directory is registered as is, without a fetch.
//! Art registration is check-then-insert: once an album has art it is never
//! replaced.
//!
//! The art file name is per directory, not per album. Two albums downloaded
//! into the same directory share one image: the first one written.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::MirrorConfig;
use crate::error::{Error, FileSystemError, LibraryError, Result};
use crate::model::{AlbumId, DownloadedFile, IndexEntryId, LibraryIndexEntry};
use crate::store::{Catalog, LibraryIndex};

#[allow(clippy::expect_used)]
static LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:the|an|a)\s+").expect("valid regex"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalized, case-folded form of a title used for deduplication.
///
/// Titles differing only in case, surrounding punctuation, a leading
/// article or whitespace runs produce the same key.
#[must_use]
pub fn title_key(title: &str) -> String {
    let lowered = title.to_lowercase();
    let collapsed = WHITESPACE.replace_all(lowered.trim(), " ");
    let trimmed = collapsed.trim_matches(|c: char| !c.is_alphanumeric());
    let without_article = LEADING_ARTICLE.replace(trimmed, "");
    without_article
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// What happened to an album's cover art during a mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtOutcome {
    /// Art was fetched, written and registered at this path.
    Registered(PathBuf),
    /// The album already had art; nothing was fetched.
    AlreadyPresent,
    /// The track carries no cover art reference.
    NoCoverArt,
    /// The index did not group the entry into an album.
    NoAlbum,
    /// Fetching, writing or registering failed; the album has no art.
    Failed(String),
}

/// Result of mirroring one downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    /// Identity of the inserted index entry.
    pub entry_id: IndexEntryId,
    /// Number of prior entries removed for the same file.
    pub replaced: usize,
    /// Album the entry was grouped into.
    pub album: Option<AlbumId>,
    /// Cover art handling.
    pub art: ArtOutcome,
}

/// Mirrors downloads into a [`LibraryIndex`].
pub struct LibraryMirror<I, C> {
    index: I,
    catalog: C,
    config: MirrorConfig,
}

impl<I, C> LibraryMirror<I, C>
where
    I: LibraryIndex,
    C: Catalog,
{
    /// Create a mirror with default settings.
    pub fn new(index: I, catalog: C) -> Self {
        Self {
            index,
            catalog,
            config: MirrorConfig::default(),
        }
    }

    /// Create a mirror with explicit settings.
    pub fn with_config(index: I, catalog: C, config: MirrorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index,
            catalog,
            config,
        })
    }

    /// The library index.
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Active settings.
    pub const fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Upsert `file` into the index and cache album art if the album has none.
    pub fn mirror(&self, file: &DownloadedFile) -> Result<MirrorOutcome> {
        let replaced = self.unmirror(file)?;

        let track = &file.track;
        let entry = LibraryIndexEntry {
            title: track.title.clone(),
            title_key: title_key(&track.title),
            artist: track.artist.clone(),
            album: track.album.clone(),
            track_number: track.track_number,
            year: track.year,
            path: file.path.clone(),
            content_type: track.content_type.clone(),
            is_music: true,
        };
        let entry_id = self.index.insert(&entry)?;
        debug!("Indexed {} as entry {}", file.path.display(), entry_id);

        let album = self.index.album_id_for(entry_id)?;
        let art = match album {
            Some(album) => self.ensure_album_art(file, album)?,
            None => ArtOutcome::NoAlbum,
        };

        Ok(MirrorOutcome {
            entry_id,
            replaced,
            album,
            art,
        })
    }

    /// Remove the index entries `mirror` would have created for `file`.
    ///
    /// Cached album art is left alone.
    pub fn unmirror(&self, file: &DownloadedFile) -> Result<usize> {
        let key = title_key(&file.track.title);
        let removed = self.index.delete_by_title_key_and_path(&key, &file.path)?;
        if removed > 0 {
            info!(
                "Removed {} index entries for {} ({})",
                removed,
                file.track.title,
                file.path.display()
            );
        }
        Ok(removed)
    }

    fn ensure_album_art(&self, file: &DownloadedFile, album: AlbumId) -> Result<ArtOutcome> {
        if self.index.has_art(album)? {
            return Ok(ArtOutcome::AlreadyPresent);
        }
        let Some(cover_art) = file.track.cover_art.as_deref() else {
            debug!("Track {} has no cover art", file.track.id);
            return Ok(ArtOutcome::NoCoverArt);
        };

        match self.cache_album_art(file, album, cover_art) {
            Ok(path) => {
                info!("Added album art for album {}: {}", album, path.display());
                Ok(ArtOutcome::Registered(path))
            }
            Err(e) => {
                let failure = LibraryError::ArtFetchFailed {
                    album,
                    reason: e.to_string(),
                };
                warn!("{}", failure);
                Ok(ArtOutcome::Failed(e.to_string()))
            }
        }
    }

    fn cache_album_art(
        &self,
        file: &DownloadedFile,
        album: AlbumId,
        cover_art: &str,
    ) -> Result<PathBuf> {
        let dir = file.directory().ok_or_else(|| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: file.path.clone(),
                reason: "download has no parent directory".to_string(),
            })
        })?;
        let path = dir.join(&self.config.art_file_name);

        if path.exists() {
            debug!("Registering existing art file {}", path.display());
            self.index.register_art(album, &path)?;
            return Ok(path);
        }

        let bytes = self
            .catalog
            .fetch_cover_art(cover_art, self.config.cover_art_size)?;
        if bytes.is_empty() {
            return Err(LibraryError::EmptyArt {
                cover_art: cover_art.to_string(),
            }
            .into());
        }

        write_new_file(dir, &path, &bytes)?;

        if let Err(e) = self.index.register_art(album, &path) {
            remove_created_art(&path);
            return Err(e);
        }

        Ok(path)
    }
}

/// Write `bytes` to `path` through a temporary file in `dir`.
///
/// Fails without touching `path` if it already exists. The temporary file
/// is removed on every failure.
fn write_new_file(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let write_failed = |reason: String| {
        Error::FileSystem(FileSystemError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        })
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.flush())
        .map_err(|e| write_failed(e.to_string()))?;
    staged
        .persist_noclobber(path)
        .map_err(|e| write_failed(e.error.to_string()))?;
    Ok(())
}

fn remove_created_art(path: &Path) {
    if path.exists()
        && let Err(e) = fs::remove_file(path)
    {
        warn!("Failed to remove art file {}: {}", path.display(), e);
    }
}
