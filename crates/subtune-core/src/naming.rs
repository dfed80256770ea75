//! Default names for newly created playlists.
//!
//! Naming is a strategy handed to the editor, so localized or otherwise
//! customized names stay with the embedding application.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Default chrono format: medium date followed by a short time.
pub const DEFAULT_NAME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Whether `format` is a chrono format string every instant can be
/// rendered with.
#[must_use]
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Produces a name for a playlist created at `now`.
pub trait PlaylistNamer: Send + Sync {
    /// Name for a playlist created at `now`.
    fn name(&self, now: DateTime<Utc>) -> String;
}

impl<F> PlaylistNamer for F
where
    F: Fn(DateTime<Utc>) -> String + Send + Sync,
{
    fn name(&self, now: DateTime<Utc>) -> String {
        self(now)
    }
}

/// Names playlists after their creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeNamer {
    format: String,
}

impl DateTimeNamer {
    /// Namer using a chrono format string.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for DateTimeNamer {
    fn default() -> Self {
        Self::new(DEFAULT_NAME_FORMAT)
    }
}

impl PlaylistNamer for DateTimeNamer {
    fn name(&self, now: DateTime<Utc>) -> String {
        let mut name = String::new();
        if write!(name, "{}", now.format(&self.format)).is_err() {
            warn!("Invalid playlist name format {:?}, using default", self.format);
            name.clear();
            // Default format always renders.
            let _ = write!(name, "{}", now.format(DEFAULT_NAME_FORMAT));
        }
        name
    }
}

/// Prefix another namer's output, e.g. `"Starred Oct 3, 2026 9:15 PM"`.
pub struct PrefixedNamer<N> {
    prefix: String,
    inner: N,
}

impl<N: PlaylistNamer> PrefixedNamer<N> {
    /// Wrap `inner`, prepending `prefix` and a space.
    pub fn new(prefix: impl Into<String>, inner: N) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }
}

impl<N: PlaylistNamer> PlaylistNamer for PrefixedNamer<N> {
    fn name(&self, now: DateTime<Utc>) -> String {
        let base = self.inner.name(now);
        if self.prefix.is_empty() {
            base
        } else {
            format!("{} {base}", self.prefix)
        }
    }
}
