//! # rss-dl
//!
//! Watch-list driven RSS/Atom torrent fetcher.
//!
//! rss-dl polls a single feed, matches entry titles against a plain-text
//! watch-list, and obtains each new match at most once. Magnet links become
//! small bencoded descriptor files synthesized into the output directory;
//! HTTPS `.torrent` links are fetched and written verbatim. Every completed
//! download is recorded in a flat append-only ledger that suppresses
//! re-downloads on later runs, so the feed can repeat entries freely.
//!
//! One invocation is one pass over the feed. There is no daemon mode and no
//! internal scheduling; run the binary from cron or a systemd timer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rss_dl::{Config, DownloadDispatcher, DownloadLedger, FeedFetcher, FeedRunner, WatchList};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let search_dirs = rss_dl::config::default_search_dirs();
//!     let config = Config::discover(&search_dirs)?;
//!
//!     let watchlist = WatchList::load(&config.watchlist_file)?;
//!     let ledger = Arc::new(DownloadLedger::new(config.ledger_file.clone()));
//!     let client = reqwest::Client::new();
//!     let dispatcher = DownloadDispatcher::new(
//!         config.output_dir.clone(),
//!         client.clone(),
//!         Arc::clone(&ledger),
//!     );
//!     let runner = FeedRunner::new(
//!         config.feed_url.clone(),
//!         FeedFetcher::new(client),
//!         watchlist,
//!         ledger,
//!         dispatcher,
//!     );
//!
//!     let report = runner.run().await?;
//!     println!("saved {} new downloads", report.saved);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command-line interface definitions
pub mod cli;
/// Configuration discovery and path resolution
pub mod config;
/// Link classification and download dispatch
pub mod dispatch;
/// Error types
pub mod error;
/// Feed fetching and parsing
pub mod feed;
/// Download ledger persistence
pub mod ledger;
/// Single-run orchestration
pub mod runner;
/// Watch-list matching
pub mod watchlist;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{Dispatch, DownloadDispatcher, LinkKind, classify};
pub use error::{Error, Result};
pub use feed::{FeedEntry, FeedFetcher};
pub use ledger::DownloadLedger;
pub use runner::{FeedRunner, RunReport};
pub use watchlist::WatchList;
