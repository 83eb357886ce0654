//! Link classification and download dispatch.
//!
//! Each matched feed entry carries a link that is obtained in one of two
//! ways. Magnet URIs never touch the network: a small bencoded descriptor
//! file embedding the URI is synthesized into the output directory, where a
//! watch-folder client picks it up. HTTPS links whose path ends in
//! `.torrent` are fetched and written verbatim. Everything else is skipped.
//!
//! Artifacts are written with an exclusive create, so an existing file is
//! never clobbered; hitting one is treated as already-satisfied. On both
//! download paths the canonical ledger key is recorded once the artifact is
//! on disk, including the already-satisfied case, which converges the ledger
//! with filesystem reality.

use crate::error::{Error, Result};
use crate::ledger::DownloadLedger;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Scheme prefix identifying magnet links.
const MAGNET_PREFIX: &str = "magnet:";

/// Suffix shared by torrent-file URLs and the artifacts written here.
const TORRENT_SUFFIX: &str = ".torrent";

/// Transport classification of a feed entry link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// A magnet URI; a descriptor file is synthesized locally.
    Magnet,
    /// An HTTPS URL pointing at a torrent file.
    TorrentFile {
        /// Percent-decoded final path segment, used as the artifact name.
        filename: String,
    },
    /// Anything else: empty or relative links, unknown schemes, non-torrent
    /// paths. Skipped without a ledger record so a later feed revision can
    /// still supply a usable link.
    Unsupported,
}

impl LinkKind {
    /// Canonical ledger key for an entry with this transport.
    ///
    /// Magnet links carry no stable filename, so the feed title is the key.
    /// Torrent files use the decoded filename with the `.torrent` suffix
    /// stripped. Unsupported links have no key; they are never recorded.
    ///
    /// The ledger lookup before dispatch and the record after it both go
    /// through this method, so the two always agree on an entry's identity.
    pub fn ledger_key(&self, title: &str) -> Option<String> {
        match self {
            LinkKind::Magnet => Some(title.to_string()),
            LinkKind::TorrentFile { filename } => Some(torrent_key(filename).to_string()),
            LinkKind::Unsupported => None,
        }
    }
}

/// Classify `link` into the transport used to obtain its artifact.
///
/// Magnet detection is a plain prefix check. The torrent-file path requires
/// an absolute HTTPS URL whose path (query excluded) ends in `.torrent` and
/// whose final segment percent-decodes to valid UTF-8.
pub fn classify(link: &str) -> LinkKind {
    if link.starts_with(MAGNET_PREFIX) {
        return LinkKind::Magnet;
    }
    let Ok(url) = url::Url::parse(link) else {
        return LinkKind::Unsupported;
    };
    if url.scheme() != "https" || !url.path().ends_with(TORRENT_SUFFIX) {
        return LinkKind::Unsupported;
    }
    if let Some(mut segments) = url.path_segments()
        && let Some(last_segment) = segments.next_back()
        && let Ok(decoded) = urlencoding::decode(last_segment)
    {
        return LinkKind::TorrentFile {
            filename: decoded.into_owned(),
        };
    }
    LinkKind::Unsupported
}

/// Ledger key of a torrent artifact: the filename minus its suffix.
fn torrent_key(filename: &str) -> &str {
    filename.strip_suffix(TORRENT_SUFFIX).unwrap_or(filename)
}

/// Bencoded single-key dictionary wrapping a magnet URI.
///
/// Layout is `d10:magnet-uri<len>:<uri>e` with `<len>` the URI's byte
/// length. The exact bytes are a format contract with the watch-folder
/// clients that consume the output directory.
fn magnet_descriptor(uri: &str) -> String {
    format!("d10:magnet-uri{}:{}e", uri.len(), uri)
}

/// Whether `name` is usable as a single file name under the output
/// directory. Rejects empty names, the dot entries, path separators, and
/// NUL, any of which could escape the directory or fail the write in a
/// confusing way.
fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Exclusive-create write of a new artifact.
///
/// `create_new` makes the filesystem the arbiter: whichever writer gets
/// there first wins, and everyone else sees [`Error::ArtifactExists`].
fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = match File::options().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::ArtifactExists {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    file.write_all(bytes)?;
    Ok(())
}

/// What a single dispatch attempt did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A new artifact was written and its key recorded.
    Saved {
        /// Canonical key recorded in the ledger.
        key: String,
        /// Path of the written artifact.
        path: PathBuf,
    },
    /// The artifact was already on disk; the key was recorded anyway.
    AlreadyPresent {
        /// Canonical key recorded in the ledger.
        key: String,
        /// Path of the pre-existing artifact.
        path: PathBuf,
    },
    /// The entry was skipped without touching the ledger.
    Skipped,
}

/// Obtains the artifact for a single feed entry and records completion.
pub struct DownloadDispatcher {
    output_dir: PathBuf,
    client: reqwest::Client,
    ledger: Arc<DownloadLedger>,
}

impl DownloadDispatcher {
    /// Create a dispatcher writing artifacts under `output_dir` and
    /// recording completions in `ledger`.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        client: reqwest::Client,
        ledger: Arc<DownloadLedger>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            client,
            ledger,
        }
    }

    /// Obtain the artifact for one feed entry.
    ///
    /// Classifies `link` and follows the matching path. The ledger key is
    /// recorded only after the artifact is durably on disk, never before, so
    /// a crash between the two leaves the entry eligible for the next run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DownloadFailed`] for per-entry fetch or write
    /// problems (the caller logs these and moves on) and
    /// [`Error::LedgerUnwritable`] when the completion cannot be recorded,
    /// which is fatal for the run.
    pub async fn dispatch(&self, title: &str, link: &str) -> Result<Dispatch> {
        match classify(link) {
            LinkKind::Magnet => self.save_magnet_descriptor(title, link),
            LinkKind::TorrentFile { filename } => self.fetch_torrent_file(link, &filename).await,
            LinkKind::Unsupported => {
                warn!(title, link, "unsupported link, skipping");
                Ok(Dispatch::Skipped)
            }
        }
    }

    /// Synthesize the bencoded descriptor for a magnet link.
    ///
    /// The artifact is named `<title>.torrent`; a title that cannot serve as
    /// a file name is skipped rather than sanitized, since renaming it would
    /// desynchronize the filename from the ledger key.
    fn save_magnet_descriptor(&self, title: &str, link: &str) -> Result<Dispatch> {
        if !is_safe_file_name(title) {
            warn!(title, "title is not usable as a file name, skipping");
            return Ok(Dispatch::Skipped);
        }
        let path = self.output_dir.join(format!("{title}{TORRENT_SUFFIX}"));
        let key = title.to_string();

        match write_new(&path, magnet_descriptor(link).as_bytes()) {
            Ok(()) => {
                info!(title, path = %path.display(), "saved magnet descriptor");
                self.ledger.record(&key)?;
                Ok(Dispatch::Saved { key, path })
            }
            Err(Error::ArtifactExists { path }) => {
                info!(title, path = %path.display(), "descriptor already on disk");
                self.ledger.record(&key)?;
                Ok(Dispatch::AlreadyPresent { key, path })
            }
            Err(Error::Io(err)) => Err(Error::DownloadFailed {
                url: link.to_string(),
                reason: format!("writing {}: {err}", path.display()),
            }),
            Err(err) => Err(err),
        }
    }

    /// Fetch a torrent file over HTTPS and write it under the output
    /// directory.
    async fn fetch_torrent_file(&self, link: &str, filename: &str) -> Result<Dispatch> {
        if !is_safe_file_name(filename) {
            warn!(link, filename, "decoded file name is not usable, skipping");
            return Ok(Dispatch::Skipped);
        }
        let path = self.output_dir.join(filename);
        let key = torrent_key(filename).to_string();

        let response = self.client.get(link).send().await.map_err(|e| {
            let reason = if e.is_connect() {
                format!("connection failed: {e}")
            } else {
                format!("request failed: {e}")
            };
            Error::DownloadFailed {
                url: link.to_string(),
                reason,
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailed {
                url: link.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        let payload = response.bytes().await.map_err(|e| Error::DownloadFailed {
            url: link.to_string(),
            reason: format!("reading response body: {e}"),
        })?;

        match write_new(&path, &payload) {
            Ok(()) => {
                info!(
                    filename,
                    bytes = payload.len(),
                    path = %path.display(),
                    "saved torrent file"
                );
                self.ledger.record(&key)?;
                Ok(Dispatch::Saved { key, path })
            }
            Err(Error::ArtifactExists { path }) => {
                info!(filename, path = %path.display(), "torrent file already on disk");
                self.ledger.record(&key)?;
                Ok(Dispatch::AlreadyPresent { key, path })
            }
            Err(Error::Io(err)) => Err(Error::DownloadFailed {
                url: link.to_string(),
                reason: format!("writing {}: {err}", path.display()),
            }),
            Err(err) => Err(err),
        }
    }
}
