//! Core configuration.
//!
//! Settings are stored as JSON. Every field has a default, so a partial or
//! missing file still loads.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, FileSystemError, Result};
use crate::naming::{DEFAULT_NAME_FORMAT, DateTimeNamer, PrefixedNamer, is_valid_format};

/// Cover art edge length requested from the catalog, in pixels.
pub const DEFAULT_COVER_ART_SIZE: u32 = 320;

/// File name cover art is written to inside the download's directory.
pub const DEFAULT_ART_FILE_NAME: &str = "folder.jpeg";

/// Prefix for playlists built from a user's starred tracks.
pub const DEFAULT_STARRED_PREFIX: &str = "Starred";

const CONFIG_DIR: &str = "subtune";
const CONFIG_FILE: &str = "config.json";

/// Playlist editor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaylistConfig {
    /// chrono format used for generated playlist names.
    pub name_format: String,
    /// Prefix for playlists created from starred tracks.
    pub starred_prefix: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            name_format: DEFAULT_NAME_FORMAT.to_string(),
            starred_prefix: DEFAULT_STARRED_PREFIX.to_string(),
        }
    }
}

impl PlaylistConfig {
    /// Reject a name format chrono cannot render.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_format(&self.name_format) {
            return Err(Error::Configuration(format!(
                "name_format is not a valid date format: {:?}",
                self.name_format
            )));
        }
        Ok(())
    }

    /// Namer for plain new playlists.
    #[must_use]
    pub fn namer(&self) -> DateTimeNamer {
        DateTimeNamer::new(self.name_format.clone())
    }

    /// Namer for playlists of starred tracks.
    #[must_use]
    pub fn starred_namer(&self) -> PrefixedNamer<DateTimeNamer> {
        PrefixedNamer::new(self.starred_prefix.clone(), self.namer())
    }
}

/// Library mirror settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MirrorConfig {
    /// Cover art size requested from the catalog.
    pub cover_art_size: u32,
    /// File name for cached album art.
    pub art_file_name: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            cover_art_size: DEFAULT_COVER_ART_SIZE,
            art_file_name: DEFAULT_ART_FILE_NAME.to_string(),
        }
    }
}

impl MirrorConfig {
    /// Reject settings the mirror cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cover_art_size == 0 {
            return Err(Error::Configuration(
                "cover_art_size must be positive".to_string(),
            ));
        }
        let mut components = Path::new(&self.art_file_name).components();
        let bare = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !bare {
            return Err(Error::Configuration(format!(
                "art_file_name must be a bare file name, got {:?}",
                self.art_file_name
            )));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoreConfig {
    /// Playlist editor settings.
    pub playlists: PlaylistConfig,
    /// Library mirror settings.
    pub mirror: MirrorConfig,
}

impl CoreConfig {
    /// Load from the default location, or defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;
        config.playlists.validate()?;
        config.mirror.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }
}

/// Default configuration file location.
#[must_use]
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.mirror.cover_art_size, 320);
        assert_eq!(config.mirror.art_file_name, "folder.jpeg");
        assert_eq!(config.playlists.starred_prefix, "Starred");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = CoreConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("config.json");

        let mut config = CoreConfig::default();
        config.mirror.cover_art_size = 640;
        config.playlists.name_format = "%Y-%m-%d".to_string();
        config.save_to(&path).unwrap();

        assert_eq!(CoreConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"mirror": {"cover_art_size": 500}}"#).unwrap();

        let config = CoreConfig::load_from(&path).unwrap();
        assert_eq!(config.mirror.cover_art_size, 500);
        assert_eq!(config.mirror.art_file_name, DEFAULT_ART_FILE_NAME);
        assert_eq!(config.playlists, PlaylistConfig::default());
    }

    #[test]
    fn test_invalid_json_is_configuration_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = CoreConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_name_format_rejected_on_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"playlists": {"name_format": "%Q"}}"#).unwrap();

        let err = CoreConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("name_format"));
    }

    #[test]
    fn test_playlist_config_validate() {
        assert!(PlaylistConfig::default().validate().is_ok());
        let config = PlaylistConfig {
            name_format: "%Y %".to_string(),
            ..PlaylistConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_art_file_name_must_be_bare() {
        let config = MirrorConfig {
            art_file_name: "../folder.jpeg".to_string(),
            ..MirrorConfig::default()
        };
        assert!(config.validate().is_err());

        let zero = MirrorConfig {
            cover_art_size: 0,
            ..MirrorConfig::default()
        };
        assert!(zero.validate().is_err());

        assert!(MirrorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with("subtune/config.json"));
    }
}
