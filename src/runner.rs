//! Single-run orchestration.
//!
//! One invocation is one pass over the feed: fetch, then walk the entries
//! strictly in feed order, gating each on the watch-list and the download
//! ledger before handing it to the dispatcher. A failed download is logged
//! and leaves its entry unrecorded, so the next run retries it; feed-level
//! and ledger failures abort the whole run.

use crate::dispatch::{Dispatch, DownloadDispatcher, classify};
use crate::error::Result;
use crate::feed::{FeedEntry, FeedFetcher};
use crate::ledger::DownloadLedger;
use crate::watchlist::WatchList;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Counters describing what one run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Entries the feed produced.
    pub entries: usize,
    /// Entries matching the watch-list.
    pub matched: usize,
    /// New artifacts written and recorded.
    pub saved: usize,
    /// Artifacts found already on disk, recorded anyway.
    pub already_present: usize,
    /// Entries skipped: unmatched, already in the ledger, or unusable links.
    pub skipped: usize,
    /// Entries whose download failed; they stay eligible for the next run.
    pub failed: usize,
}

/// Orchestrates one pass over the watched feed.
pub struct FeedRunner {
    feed_url: String,
    fetcher: FeedFetcher,
    watchlist: WatchList,
    ledger: Arc<DownloadLedger>,
    dispatcher: DownloadDispatcher,
}

impl FeedRunner {
    /// Wire up a runner over already-constructed collaborators.
    ///
    /// `ledger` is the same handle the dispatcher records into; the runner
    /// only reads it.
    pub fn new(
        feed_url: impl Into<String>,
        fetcher: FeedFetcher,
        watchlist: WatchList,
        ledger: Arc<DownloadLedger>,
        dispatcher: DownloadDispatcher,
    ) -> Self {
        Self {
            feed_url: feed_url.into(),
            fetcher,
            watchlist,
            ledger,
            dispatcher,
        }
    }

    /// Process the feed once and report what happened.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::FeedParseFailed`](crate::Error::FeedParseFailed)
    /// from the fetch and any fatal error from entry processing, ledger
    /// reads included. Per-entry download failures are absorbed into the
    /// report.
    pub async fn run(&self) -> Result<RunReport> {
        let entries = self.fetcher.fetch_entries(&self.feed_url).await?;
        let mut report = RunReport {
            entries: entries.len(),
            ..RunReport::default()
        };

        for entry in &entries {
            self.process_entry(entry, &mut report).await?;
        }

        info!(
            entries = report.entries,
            matched = report.matched,
            saved = report.saved,
            already_present = report.already_present,
            skipped = report.skipped,
            failed = report.failed,
            "run complete"
        );
        Ok(report)
    }

    /// Handle one entry: watch-list gate, ledger gate, then dispatch.
    async fn process_entry(&self, entry: &FeedEntry, report: &mut RunReport) -> Result<()> {
        if !self.watchlist.is_wanted(&entry.title) {
            debug!(title = %entry.title, "not on the watch-list, skipping");
            report.skipped += 1;
            return Ok(());
        }
        report.matched += 1;
        info!(title = %entry.title, "matched watch-list");

        // The key here must be the one the dispatcher will record, so the
        // lookup and the eventual record agree on the entry's identity.
        if let Some(key) = classify(&entry.link).ledger_key(&entry.title)
            && self.ledger.contains(&key)?
        {
            info!(title = %entry.title, key = %key, "already downloaded, skipping");
            report.skipped += 1;
            return Ok(());
        }

        match self.dispatcher.dispatch(&entry.title, &entry.link).await {
            Ok(Dispatch::Saved { key, .. }) => {
                debug!(title = %entry.title, key = %key, "saved");
                report.saved += 1;
            }
            Ok(Dispatch::AlreadyPresent { key, .. }) => {
                debug!(title = %entry.title, key = %key, "already present");
                report.already_present += 1;
            }
            Ok(Dispatch::Skipped) => {
                report.skipped += 1;
            }
            Err(err) if !err.is_fatal() => {
                warn!(title = %entry.title, error = %err, "download failed, will retry next run");
                report.failed += 1;
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}
