//! Watch-list loading and title matching.
//!
//! The watch-list is a plain-text file with one show-name fragment per line,
//! edited by hand. Lines are trimmed before use; blank lines, lines whose
//! first character is `#`, and fragments shorter than three characters are
//! ignored. A feed entry is wanted when any surviving fragment occurs as a
//! case-sensitive substring of its title.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Minimum usable fragment length; anything shorter matches far too much.
const MIN_FRAGMENT_LEN: usize = 3;

/// In-memory watch-list used to decide whether a feed entry is wanted.
#[derive(Clone, Debug)]
pub struct WatchList {
    /// Usable fragments in file order.
    fragments: Vec<String>,
}

impl WatchList {
    /// Load the watch-list from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchListUnreadable`] when the file cannot be read;
    /// without a watch-list no entry can match, so the run aborts rather
    /// than silently do nothing.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::WatchListUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::from_content(&content);
        debug!(
            path = %path.display(),
            fragments = list.len(),
            "loaded watch-list"
        );
        Ok(list)
    }

    /// Build a watch-list from raw file content, applying the line filters.
    pub fn from_content(content: &str) -> Self {
        let fragments = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .filter(|line| line.chars().count() >= MIN_FRAGMENT_LEN)
            .map(str::to_string)
            .collect();
        Self { fragments }
    }

    /// Number of usable fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True when no usable fragments were loaded.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Whether `title` matches the watch-list.
    ///
    /// Fragments are tried in file order and matching is case-sensitive
    /// substring containment, so `Show.Name` matches
    /// `Show.Name.S01E04.720p`.
    pub fn is_wanted(&self, title: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| title.contains(fragment.as_str()))
    }
}
