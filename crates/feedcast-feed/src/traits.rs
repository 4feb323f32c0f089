use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FeedError;

/// A single episode descriptor yielded by the Feed Parser:
/// "guid, title, audio URL, duration, publish time".
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEpisode {
    pub guid: String,
    pub title: String,
    pub audio_url: String,
    pub duration_seconds: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub episodes: Vec<FeedEpisode>,
}

/// The Feed Parser boundary: fetch an RSS URL and yield episode
/// descriptors. Injected as `Arc<dyn FeedFetcher>` so Discovery is
/// testable against a stub feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, feed_url: &str) -> Result<ParsedFeed, FeedError>;
}
