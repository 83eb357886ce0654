//! Feed fetching and parsing.
//!
//! The watched feed is fetched over HTTP and reduced to `(title, link)`
//! pairs, which is all the downstream stages need. Parsing tries RSS 2.0
//! first and falls back to Atom; when both parsers reject the payload the
//! run aborts with the combined diagnostics, since a feed that cannot be
//! read means nothing downstream can be trusted.

use crate::error::{Error, Result};
use tracing::debug;

/// One item from the polled feed.
///
/// Feeds in the wild omit titles and links often enough that both fields
/// default to the empty string rather than an `Option`; an empty title
/// simply never matches the watch-list and an empty link classifies as
/// unsupported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry title, empty when the feed omits it.
    pub title: String,
    /// Entry link, empty when the feed omits it.
    pub link: String,
}

/// Fetches and parses the watched feed.
pub struct FeedFetcher {
    http_client: reqwest::Client,
}

impl FeedFetcher {
    /// Create a fetcher using `http_client` for HTTP.
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Fetch `url` and parse the response into feed entries, preserving
    /// document order.
    ///
    /// # Errors
    ///
    /// Every failure mode, from the request itself through an HTTP error
    /// status to a payload neither parser accepts, maps to
    /// [`Error::FeedParseFailed`].
    pub async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        debug!(url, "fetching feed");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FeedParseFailed {
                url: url.to_string(),
                reason: format!("failed to fetch feed: {e}"),
            })?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::FeedParseFailed {
                url: url.to_string(),
                reason: format!("feed returned HTTP {}", status.as_u16()),
            });
        }

        let content = response.text().await.map_err(|e| Error::FeedParseFailed {
            url: url.to_string(),
            reason: format!("failed to read feed content: {e}"),
        })?;

        // Try parsing as RSS first, then Atom
        match parse_as_rss(&content) {
            Ok(entries) => {
                debug!(url, entries = entries.len(), "parsed feed as RSS");
                Ok(entries)
            }
            Err(rss_err) => match parse_as_atom(&content) {
                Ok(entries) => {
                    debug!(url, entries = entries.len(), "parsed feed as Atom");
                    Ok(entries)
                }
                Err(atom_err) => Err(Error::FeedParseFailed {
                    url: url.to_string(),
                    reason: format!(
                        "not parseable as RSS or Atom. RSS error: {rss_err}. Atom error: {atom_err}"
                    ),
                }),
            },
        }
    }
}

/// Parse feed content as RSS 2.0.
fn parse_as_rss(content: &str) -> std::result::Result<Vec<FeedEntry>, rss::Error> {
    let channel = content.parse::<rss::Channel>()?;
    let entries = channel
        .items()
        .iter()
        .map(|item| FeedEntry {
            title: item.title().unwrap_or("").to_string(),
            link: item.link().unwrap_or("").to_string(),
        })
        .collect();
    Ok(entries)
}

/// Parse feed content as Atom, taking each entry's first link.
fn parse_as_atom(content: &str) -> std::result::Result<Vec<FeedEntry>, atom_syndication::Error> {
    let feed = atom_syndication::Feed::read_from(content.as_bytes())?;
    let entries = feed
        .entries()
        .iter()
        .map(|entry| FeedEntry {
            title: entry.title().as_str().to_string(),
            link: entry
                .links()
                .first()
                .map(|link| link.href().to_string())
                .unwrap_or_default(),
        })
        .collect();
    Ok(entries)
}
