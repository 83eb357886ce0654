//! rss-dl binary entry point.
//!
//! Wires configuration, logging, and the feed runner together, then maps
//! the outcome onto the process exit code: 0 for a completed run, 1 for any
//! fatal condition. Per-entry download failures do not fail the run; they
//! are retried on the next invocation.

use clap::Parser;
use rss_dl::cli::CliArgs;
use rss_dl::config::{self, Config};
use rss_dl::{
    DownloadDispatcher, DownloadLedger, FeedFetcher, FeedRunner, Result, RunReport, WatchList,
};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Append-only audit log written next to the executable.
const LOG_FILE_NAME: &str = "rss-dl.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);

    match run(&args).await {
        Ok(_report) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run aborted");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Load configuration, build the component graph, and process the feed once.
async fn run(args: &CliArgs) -> Result<RunReport> {
    let search_dirs = config::default_search_dirs();
    let config = match &args.config {
        Some(path) => Config::load(path, &search_dirs)?,
        None => Config::discover(&search_dirs)?,
    };
    info!(
        feed = %config.feed_url,
        output_dir = %config.output_dir.display(),
        ledger = %config.ledger_file.display(),
        "starting run"
    );

    let watchlist = WatchList::load(&config.watchlist_file)?;
    let ledger = Arc::new(DownloadLedger::new(config.ledger_file.clone()));
    let client = http_client()?;
    let dispatcher =
        DownloadDispatcher::new(config.output_dir.clone(), client.clone(), Arc::clone(&ledger));
    let runner = FeedRunner::new(
        config.feed_url.clone(),
        FeedFetcher::new(client),
        watchlist,
        ledger,
        dispatcher,
    );
    runner.run().await
}

/// HTTP client shared by the feed fetch and artifact downloads.
///
/// No request timeout is configured; the run is strictly sequential and a
/// caller that needs bounded run time bounds the process externally.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("rss-dl/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            rss_dl::Error::Io(std::io::Error::other(format!(
                "failed to create HTTP client: {e}"
            )))
        })
}

/// Install the layered subscriber: console output plus an append-mode audit
/// log that accumulates across runs.
///
/// The default level comes from the verbosity flags; a `RUST_LOG` directive
/// overrides it. When no log file location is writable the run proceeds
/// with console logging only.
fn init_logging(args: &CliArgs) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let audit = open_log_file().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(audit)
        .init();
}

/// Open the audit log in append mode, preferring the executable's directory
/// and falling back to the working directory.
fn open_log_file() -> Option<File> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        candidates.push(dir.join(LOG_FILE_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(LOG_FILE_NAME));
    }
    candidates
        .into_iter()
        .find_map(|path| File::options().append(true).create(true).open(path).ok())
}
