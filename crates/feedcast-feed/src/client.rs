//! An RSS/Atom feed client over `feed-rs`: fetches the raw bytes, then
//! parses them with `feed_rs::parser::parse`, projecting each entry into
//! a podcast-specific episode descriptor (audio enclosure URL +
//! duration), skipping entries with no discoverable audio enclosure.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Entry;
use tracing::warn;

use crate::error::FeedError;
use crate::traits::{FeedEpisode, FeedFetcher, ParsedFeed};

pub struct HttpFeedFetcher {
    http: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(15))
            .build()
            .expect("failed to build feed HTTP client");
        Self { http }
    }
}

impl Default for HttpFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, feed_url: &str) -> Result<ParsedFeed, FeedError> {
        let response = self
            .http
            .get(feed_url)
            .header("User-Agent", "feedcast-feed/0.1")
            .send()
            .await
            .map_err(FeedError::Request)?;

        let bytes = response.bytes().await.map_err(FeedError::Request)?;
        let feed = feed_rs::parser::parse(&bytes[..])?;

        let title = feed.title.map(|t| t.content);
        let episodes = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let guid = entry.id.clone();
                let descriptor = episode_from_entry(entry);
                if descriptor.is_none() {
                    warn!(%guid, feed_url, "feed entry has no discoverable audio enclosure, skipping");
                }
                descriptor
            })
            .collect();

        Ok(ParsedFeed { title, episodes })
    }
}

/// Extracts an episode descriptor from a feed entry. Podcast RSS
/// typically carries the enclosure as an `<enclosure>` element, which
/// `feed-rs` surfaces as a `Link` with an `audio/*` media type; some
/// feeds instead use Media RSS `<media:content>`, surfaced as
/// `entry.media`. Both are checked, media first since it carries an
/// explicit duration.
fn episode_from_entry(entry: Entry) -> Option<FeedEpisode> {
    if entry.id.is_empty() {
        return None;
    }

    let published_at = entry.published.or(entry.updated).map(|dt| dt.with_timezone(&Utc));

    let from_media = entry.media.iter().find_map(|media| {
        media.content.iter().find_map(|content| {
            let url = content.url.as_ref()?;
            let duration = content.duration.or(media.duration);
            Some((url.to_string(), duration.map(|d| d.as_secs() as i64)))
        })
    });

    let from_enclosure = entry.links.iter().find_map(|link| {
        let is_audio_enclosure = link
            .media_type
            .as_deref()
            .map(|mime| mime.starts_with("audio"))
            .unwrap_or(false)
            || link.rel.as_deref() == Some("enclosure");
        is_audio_enclosure.then(|| (link.href.clone(), None))
    });

    let (audio_url, duration_seconds) = from_media.or(from_enclosure)?;

    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| entry.id.clone());

    Some(FeedEpisode {
        guid: entry.id,
        title,
        audio_url,
        duration_seconds,
        published_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
<channel>
  <title>Example Podcast</title>
  <item>
    <title>Episode One</title>
    <guid>episode-1</guid>
    <pubDate>Mon, 27 Jul 2026 12:00:00 GMT</pubDate>
    <enclosure url="https://cdn.example.com/ep1.mp3" type="audio/mpeg" length="1000"/>
  </item>
  <item>
    <title>No Audio Episode</title>
    <guid>episode-no-audio</guid>
    <pubDate>Mon, 27 Jul 2026 12:00:00 GMT</pubDate>
  </item>
</channel>
</rss>"#;

    #[tokio::test]
    async fn fetch_parses_episodes_with_enclosures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_FEED))
            .mount(&server)
            .await;

        let fetcher = HttpFeedFetcher::new();
        let parsed = fetcher.fetch(&server.uri()).await.unwrap();

        assert_eq!(parsed.title.as_deref(), Some("Example Podcast"));
        assert_eq!(parsed.episodes.len(), 1);
        assert_eq!(parsed.episodes[0].guid, "episode-1");
        assert_eq!(parsed.episodes[0].audio_url, "https://cdn.example.com/ep1.mp3");
    }

    #[tokio::test]
    async fn entries_without_audio_enclosure_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_FEED))
            .mount(&server)
            .await;

        let fetcher = HttpFeedFetcher::new();
        let parsed = fetcher.fetch(&server.uri()).await.unwrap();

        assert!(!parsed.episodes.iter().any(|e| e.guid == "episode-no-audio"));
    }

    #[tokio::test]
    async fn malformed_body_surfaces_as_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not xml at all"))
            .mount(&server)
            .await;

        let fetcher = HttpFeedFetcher::new();
        let result = fetcher.fetch(&server.uri()).await;
        assert!(result.is_err());
    }
}
