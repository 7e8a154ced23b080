use async_trait::async_trait;
use relay_core::FeedEntry;
use thiserror::Error;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::FetchError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("feed could not be parsed: {0}")]
    Parse(String),
}

/// Supplies the entries of a syndication feed, in feed order.
///
/// A reachable feed without items yields an empty list, not an error.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

/// RSS / Atom / JSON Feed source over HTTP.
pub struct HttpFeedSource {
    fetcher: ReqwestFetcher,
}

impl HttpFeedSource {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            fetcher: ReqwestFetcher::new(settings),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let output = self.fetcher.fetch(url).await?;
        parse_feed(&output.bytes)
    }
}

/// Parses a feed document into normalized entries.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    // An empty generated id normalizes to `None`, so identity falls back to
    // the link or title instead of a per-parse random value.
    let parser = feed_rs::parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build();
    let feed = parser
        .parse(bytes)
        .map_err(|err| FeedError::Parse(err.to_string()))?;
    Ok(feed.entries.into_iter().map(entry_from_model).collect())
}

fn entry_from_model(entry: feed_rs::model::Entry) -> FeedEntry {
    let summary = entry
        .summary
        .map(|text| text.content)
        .filter(|content| !content.trim().is_empty())
        .or_else(|| entry.content.and_then(|content| content.body));

    FeedEntry {
        id: Some(entry.id),
        link: entry
            .links
            .into_iter()
            .map(|link| link.href)
            .find(|href| !href.trim().is_empty()),
        title: entry.title.map(|text| text.content),
        summary_html: summary,
        published_at: entry.published.or(entry.updated),
    }
    .normalized()
}
