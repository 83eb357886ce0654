//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

/// Watch-list driven RSS/Atom torrent fetcher.
///
/// Polls the configured feed once, obtains new watch-list matches into the
/// output directory, records them in the download ledger, and exits. Run it
/// from cron or a systemd timer for a rolling poll.
#[derive(Debug, Parser)]
#[command(name = "rss-dl", version, about)]
pub struct CliArgs {
    /// Path to the configuration file (skips the search in the working and
    /// installation directories)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug-level logging)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Default log level implied by the verbosity flags, used when the
    /// `RUST_LOG` environment variable does not override it.
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}
