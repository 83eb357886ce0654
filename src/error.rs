//! Error types for rss-dl
//!
//! One taxonomy covers the whole run. Configuration, watch-list, feed, and
//! ledger problems are fatal: the run aborts with exit code 1 rather than
//! continue on state it cannot trust. A failed download of a single entry is
//! not fatal; the entry is left unrecorded so the next invocation retries it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rss-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rss-dl
///
/// Each variant carries the context needed to print a useful diagnostic at
/// the process boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// No configuration file exists in any searched location
    #[error("no configuration file found (searched {searched:?})")]
    ConfigNotFound {
        /// Candidate paths that were checked, in search order
        searched: Vec<PathBuf>,
    },

    /// The configuration file exists but its structure or required keys are wrong
    #[error("configuration file {path} is malformed: {reason}")]
    ConfigMalformed {
        /// Path of the offending configuration file
        path: PathBuf,
        /// Deserializer diagnostic describing what is missing or invalid
        reason: String,
    },

    /// The configured output directory does not exist
    #[error("output directory does not exist: {path}")]
    OutputDirInvalid {
        /// The resolved output directory
        path: PathBuf,
    },

    /// The watch-list file could not be read
    #[error("cannot read watch-list {path}: {source}")]
    WatchListUnreadable {
        /// Path the watch-list was resolved to
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The feed could not be fetched, or parsed as either RSS or Atom
    #[error("failed to read feed {url}: {reason}")]
    FeedParseFailed {
        /// The feed URL
        url: String,
        /// Fetch or parser diagnostic
        reason: String,
    },

    /// A single artifact could not be downloaded (network, HTTP status, or write)
    #[error("download failed for {url}: {reason}")]
    DownloadFailed {
        /// The artifact URL (or magnet URI) being processed
        url: String,
        /// What went wrong
        reason: String,
    },

    /// The artifact path already exists on disk
    ///
    /// Benign: the dispatcher treats this as already-satisfied and still
    /// records the ledger key, so it never surfaces past the dispatch layer.
    #[error("artifact already exists: {path}")]
    ArtifactExists {
        /// The artifact path found on disk
        path: PathBuf,
    },

    /// The download ledger could not be appended to
    ///
    /// Fatal: losing the ability to record completions means every future
    /// run would re-download everything.
    #[error("cannot append to download ledger {path}: {source}")]
    LedgerUnwritable {
        /// Path of the ledger file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error must abort the entire run.
    ///
    /// `DownloadFailed` and `ArtifactExists` concern a single entry; the
    /// runner logs them and moves on. Everything else means the run cannot
    /// continue safely.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::DownloadFailed { .. } | Error::ArtifactExists { .. }
        )
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    #[test]
    fn per_entry_errors_are_not_fatal() {
        let download = Error::DownloadFailed {
            url: "https://example.com/a.torrent".into(),
            reason: "HTTP 404".into(),
        };
        let exists = Error::ArtifactExists {
            path: PathBuf::from("/out/a.torrent"),
        };

        assert!(!download.is_fatal());
        assert!(!exists.is_fatal());
    }

    #[test]
    fn run_level_errors_are_fatal() {
        let errors = vec![
            Error::ConfigNotFound { searched: vec![] },
            Error::ConfigMalformed {
                path: PathBuf::from("config.toml"),
                reason: "missing field `URL1`".into(),
            },
            Error::OutputDirInvalid {
                path: PathBuf::from("/missing"),
            },
            Error::WatchListUnreadable {
                path: PathBuf::from("wanted.txt"),
                source: io_err(),
            },
            Error::FeedParseFailed {
                url: "https://example.com/rss".into(),
                reason: "not XML".into(),
            },
            Error::LedgerUnwritable {
                path: PathBuf::from("downloaded.txt"),
                source: io_err(),
            },
            Error::Io(io_err()),
        ];

        for err in errors {
            assert!(err.is_fatal(), "{err} should be fatal");
        }
    }

    #[test]
    fn display_includes_path_and_reason() {
        let err = Error::ConfigMalformed {
            path: PathBuf::from("/etc/rss-dl/config.toml"),
            reason: "missing field `OUTPUT_DIR`".into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("/etc/rss-dl/config.toml"));
        assert!(msg.contains("missing field `OUTPUT_DIR`"));
    }

    #[test]
    fn download_failed_display_names_the_url() {
        let err = Error::DownloadFailed {
            url: "https://example.com/show.torrent".into(),
            reason: "HTTP 503 Service Unavailable".into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("https://example.com/show.torrent"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn ledger_unwritable_preserves_io_source() {
        let err = Error::LedgerUnwritable {
            path: PathBuf::from("downloaded.txt"),
            source: io_err(),
        };

        let source = std::error::Error::source(&err).expect("should carry a source");
        assert!(source.to_string().contains("denied"));
    }
}
