//! Durable record of completed downloads.
//!
//! The ledger is a newline-delimited text file of canonical keys, append-only
//! and safe to edit by hand. It is the at-most-once guarantee across runs: a
//! key in the file means the corresponding artifact was obtained, so later
//! runs skip it. Lookups rescan the file each time; the expected size (one
//! line per episode ever downloaded) makes a linear scan cheaper than caching
//! state that could go stale between calls.
//!
//! A ledger file that does not exist yet reads as empty and is created on the
//! first append.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only store of canonical download keys.
#[derive(Debug)]
pub struct DownloadLedger {
    path: PathBuf,
}

impl DownloadLedger {
    /// Create a ledger handle backed by `path`.
    ///
    /// The file itself may not exist yet; it appears on the first
    /// [`record`](Self::record).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `key` has already been recorded.
    ///
    /// Scans the file line by line, trimming each line and comparing for
    /// exact equality. Substring or prefix overlap between keys never causes
    /// a false positive.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors other than the file being absent, which simply
    /// reads as an empty ledger.
    pub fn contains(&self, key: &str) -> Result<bool> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        for line in BufReader::new(file).lines() {
            if line?.trim() == key {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Append `key` as a new line, creating the file if needed.
    ///
    /// Must only be called once the corresponding artifact is durably on
    /// disk; a recorded key is a promise that the download completed.
    /// Duplicate keys are tolerated, they just add a redundant line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerUnwritable`] when the file cannot be opened or
    /// appended. Callers treat this as fatal: without the record, every
    /// future run would download the artifact again.
    pub fn record(&self, key: &str) -> Result<()> {
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|source| Error::LedgerUnwritable {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(format!("{key}\n").as_bytes())
            .map_err(|source| Error::LedgerUnwritable {
                path: self.path.clone(),
                source,
            })?;
        debug!(key, path = %self.path.display(), "recorded download");
        Ok(())
    }
}
