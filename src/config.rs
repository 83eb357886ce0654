//! Configuration discovery, parsing, and path resolution.
//!
//! Configuration lives in a `config.toml` holding a single
//! `[rss-downloader]` table. The key names are the historical upper-case
//! ones (`URL1`, `OUTPUT_DIR`, `RSS_DOWNLOADS_FILE`, `WANTED_SHOWS_FILE`) so
//! existing setups keep working unchanged.
//!
//! Discovery checks the working directory first and the installation
//! directory second. Relative watch-list and ledger paths resolve through
//! the same directory list; a ledger that exists nowhere yet is anchored to
//! the installation directory and created on first append.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in each search directory during discovery.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Whole-file shape: exactly one `[rss-downloader]` table.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "rss-downloader")]
    section: Section,
}

/// Raw key values as written in the file, before path resolution.
#[derive(Debug, Deserialize)]
struct Section {
    #[serde(rename = "URL1")]
    url1: String,
    #[serde(rename = "OUTPUT_DIR")]
    output_dir: PathBuf,
    #[serde(rename = "RSS_DOWNLOADS_FILE")]
    rss_downloads_file: PathBuf,
    #[serde(rename = "WANTED_SHOWS_FILE")]
    wanted_shows_file: PathBuf,
}

/// Resolved, validated runtime configuration.
///
/// Built once at startup and passed into the components that need it;
/// nothing reads configuration ambiently after this point.
#[derive(Clone, Debug)]
pub struct Config {
    /// Feed URL polled each run.
    pub feed_url: String,
    /// Directory artifacts are written into. Verified to exist at load.
    pub output_dir: PathBuf,
    /// Resolved download ledger path. May not exist yet.
    pub ledger_file: PathBuf,
    /// Resolved watch-list path.
    pub watchlist_file: PathBuf,
}

impl Config {
    /// Discover and load the configuration from `search_dirs`, in order.
    ///
    /// The first directory containing a [`CONFIG_FILE_NAME`] wins. The same
    /// list then provides the fallback bases for relative watch-list and
    /// ledger paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when no candidate exists, plus
    /// everything [`load`](Self::load) can return.
    pub fn discover(search_dirs: &[PathBuf]) -> Result<Self> {
        let mut searched = Vec::new();
        for dir in search_dirs {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "found configuration");
                return Self::load(&candidate, search_dirs);
            }
            searched.push(candidate);
        }
        Err(Error::ConfigNotFound { searched })
    }

    /// Load the configuration from an explicit file path.
    ///
    /// `search_dirs` still provides the bases that relative watch-list and
    /// ledger paths resolve against.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] when `path` is not a file,
    /// [`Error::ConfigMalformed`] when it does not deserialize (missing
    /// table, missing key, or type mismatch), and
    /// [`Error::OutputDirInvalid`] when the configured output directory does
    /// not exist. The output directory is never created on the user's
    /// behalf; a typo there would otherwise silently scatter downloads.
    pub fn load(path: &Path, search_dirs: &[PathBuf]) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                searched: vec![path.to_path_buf()],
            });
        }
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| Error::ConfigMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let section = file.section;

        if !section.output_dir.is_dir() {
            return Err(Error::OutputDirInvalid {
                path: section.output_dir,
            });
        }

        let watchlist_file = resolve_existing(&section.wanted_shows_file, search_dirs)
            .unwrap_or_else(|| join_first(search_dirs, &section.wanted_shows_file));
        let ledger_file = match resolve_existing(&section.rss_downloads_file, search_dirs) {
            Some(existing) => existing,
            None => {
                let fallback = join_last(search_dirs, &section.rss_downloads_file);
                info!(
                    path = %fallback.display(),
                    "download ledger not found, a new one will be created on first record"
                );
                fallback
            }
        };

        let config = Self {
            feed_url: section.url1,
            output_dir: section.output_dir,
            ledger_file,
            watchlist_file,
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}

/// Candidate directories for discovery and relative-path resolution: the
/// working directory first, then the executable's directory when known.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    if let Ok(exe) = env::current_exe()
        && let Some(dir) = exe.parent()
    {
        dirs.push(dir.to_path_buf());
    }
    dirs
}

/// First `dir/path` that already exists as a file, in search order.
///
/// An absolute `path` resolves to itself, since joining an absolute path
/// replaces the base.
fn resolve_existing(path: &Path, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.is_file())
}

/// `path` anchored to the first search directory.
fn join_first(search_dirs: &[PathBuf], path: &Path) -> PathBuf {
    search_dirs
        .first()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

/// `path` anchored to the last search directory, the installation one.
fn join_last(search_dirs: &[PathBuf], path: &Path) -> PathBuf {
    search_dirs
        .last()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|| path.to_path_buf())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Write a config file into `dir` whose output directory is `dir` itself.
    fn write_config(dir: &Path, ledger: &str, watchlist: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        let content = format!(
            r#"
[rss-downloader]
URL1 = "https://example.com/rss"
OUTPUT_DIR = "{}"
RSS_DOWNLOADS_FILE = "{ledger}"
WANTED_SHOWS_FILE = "{watchlist}"
"#,
            dir.display()
        );
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn discover_prefers_the_first_search_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(first.path(), "downloaded.txt", "wanted.txt");
        write_config(second.path(), "other.txt", "other.txt");
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.output_dir, first.path());
    }

    #[test]
    fn discover_falls_through_to_later_directories() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(second.path(), "downloaded.txt", "wanted.txt");
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.output_dir, second.path());
    }

    #[test]
    fn discover_without_any_config_lists_the_searched_paths() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let err = Config::discover(&dirs).unwrap_err();

        match err {
            Error::ConfigNotFound { searched } => {
                assert_eq!(searched.len(), 2);
                assert_eq!(searched[0], first.path().join(CONFIG_FILE_NAME));
            }
            other => panic!("expected ConfigNotFound, got {other}"),
        }
    }

    #[test]
    fn missing_key_is_config_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "[rss-downloader]\nURL1 = \"https://example.com/rss\"\n",
        )
        .unwrap();

        let err = Config::load(&path, &[dir.path().to_path_buf()]).unwrap_err();

        match err {
            Error::ConfigMalformed { reason, .. } => {
                assert!(reason.contains("OUTPUT_DIR"), "reason: {reason}");
            }
            other => panic!("expected ConfigMalformed, got {other}"),
        }
    }

    #[test]
    fn missing_section_is_config_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "URL1 = \"https://example.com/rss\"\n").unwrap();

        let err = Config::load(&path, &[dir.path().to_path_buf()]).unwrap_err();

        assert!(matches!(err, Error::ConfigMalformed { .. }));
    }

    #[test]
    fn invalid_toml_is_config_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "this is not toml [").unwrap();

        let err = Config::load(&path, &[dir.path().to_path_buf()]).unwrap_err();

        assert!(matches!(err, Error::ConfigMalformed { .. }));
    }

    #[test]
    fn nonexistent_output_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let content = format!(
            r#"
[rss-downloader]
URL1 = "https://example.com/rss"
OUTPUT_DIR = "{}"
RSS_DOWNLOADS_FILE = "downloaded.txt"
WANTED_SHOWS_FILE = "wanted.txt"
"#,
            dir.path().join("no_such_dir").display()
        );
        fs::write(&path, content).unwrap();

        let err = Config::load(&path, &[dir.path().to_path_buf()]).unwrap_err();

        assert!(matches!(err, Error::OutputDirInvalid { .. }));
    }

    #[test]
    fn explicit_path_that_is_missing_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::load(&missing, &[dir.path().to_path_buf()]).unwrap_err();

        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn relative_paths_resolve_to_where_the_files_exist() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(first.path(), "downloaded.txt", "wanted.txt");
        // Watch-list only exists in the second directory.
        fs::write(second.path().join("wanted.txt"), "Show.Name\n").unwrap();
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.watchlist_file, second.path().join("wanted.txt"));
    }

    #[test]
    fn existing_ledger_in_an_earlier_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(first.path(), "downloaded.txt", "wanted.txt");
        fs::write(first.path().join("downloaded.txt"), "").unwrap();
        fs::write(second.path().join("downloaded.txt"), "").unwrap();
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.ledger_file, first.path().join("downloaded.txt"));
    }

    #[test]
    fn absent_ledger_is_anchored_to_the_last_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(first.path(), "downloaded.txt", "wanted.txt");
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.ledger_file, second.path().join("downloaded.txt"));
    }

    #[test]
    fn absent_watchlist_is_anchored_to_the_first_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_config(first.path(), "downloaded.txt", "wanted.txt");
        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let config = Config::discover(&dirs).unwrap();

        assert_eq!(config.watchlist_file, first.path().join("wanted.txt"));
    }

    #[test]
    fn absolute_paths_are_kept_as_written() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("elsewhere").join("downloaded.txt");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let content = format!(
            r#"
[rss-downloader]
URL1 = "https://example.com/rss"
OUTPUT_DIR = "{}"
RSS_DOWNLOADS_FILE = "{}"
WANTED_SHOWS_FILE = "wanted.txt"
"#,
            dir.path().display(),
            ledger.display()
        );
        fs::write(&path, content).unwrap();

        let config = Config::load(&path, &[dir.path().to_path_buf()]).unwrap();

        assert_eq!(config.ledger_file, ledger);
    }
}
