//! Pure rendering of the RSS 2.0 document: turns published
//! digests into a `rss::Channel`. Kept free of any I/O so it can be unit
//! tested directly against constructed `PublishedDigest` values instead
//! of a live database.

use chrono_tz::Tz;
use feedcast_common::settings::Rss as RssSettings;
use feedcast_common::time::{format_itunes_duration, format_pub_date};
use feedcast_store::digests::PublishedDigest;
use rss::extension::itunes::{
    ITunesCategoryBuilder, ITunesChannelExtensionBuilder, ITunesItemExtensionBuilder, ITunesOwnerBuilder,
};
use rss::{CategoryBuilder, Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, ItemBuilder};

use crate::error::RssError;

/// Builds the RSS 2.0 document for every published digest, using the `settings.rss` channel
/// metadata and `settings.display_timezone` for every rendered timestamp.
pub fn build_channel(
    published: &[PublishedDigest],
    settings: &RssSettings,
    tz: Tz,
) -> Result<Channel, RssError> {
    let itunes_category = ITunesCategoryBuilder::default()
        .text("Technology".to_string())
        .build();

    let owner = ITunesOwnerBuilder::default()
        .email(Some(settings.owner_email.clone()))
        .name(Some(settings.channel_title.clone()))
        .build();

    let itunes_ext = ITunesChannelExtensionBuilder::default()
        .author(Some(settings.channel_title.clone()))
        .owner(Some(owner))
        .image(Some(settings.image_url.clone()))
        .categories(vec![itunes_category])
        .explicit(Some("no".to_string()))
        .build();

    let category = CategoryBuilder::default().name("Technology".to_string()).build();

    let items = published
        .iter()
        .map(|p| build_item(p, tz))
        .collect::<Result<Vec<_>, RssError>>()?;

    let channel = ChannelBuilder::default()
        .title(settings.channel_title.clone())
        // There is no separate "channel website" setting; `image_url`
        // is the only channel-level link the settings store carries.
        .link(settings.image_url.clone())
        .description(settings.channel_description.clone())
        .language(Some("en-us".to_string()))
        .itunes_ext(Some(itunes_ext))
        .categories(vec![category])
        .items(items)
        .build();

    Ok(channel)
}

fn build_item(published: &PublishedDigest, tz: Tz) -> Result<rss::Item, RssError> {
    let digest = &published.digest;
    let topic_slug = crate::slug::slugify(&published.topic_name);

    let artifact_url = digest
        .artifact_url
        .clone()
        .ok_or_else(|| RssError::Render(format!("digest {} has no artifact_url", digest.id)))?;

    let title = digest
        .mp3_title
        .clone()
        .unwrap_or_else(|| format!("{} Daily Digest - {}", published.topic_name, digest.digest_date.format("%B %d, %Y")));

    let description = digest
        .mp3_summary
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("The daily {} digest.", published.topic_name));

    let duration_seconds = digest.mp3_duration_seconds.unwrap_or(0.0) as i64;

    let enclosure = EnclosureBuilder::default()
        .url(artifact_url.clone())
        .mime_type("audio/mpeg".to_string())
        .length(digest.mp3_size_bytes.unwrap_or(0).to_string())
        .build();

    let guid = GuidBuilder::default()
        .value(format!("{topic_slug}-{}", digest.digest_date.format("%Y-%m-%d")))
        .permalink(false)
        .build();

    let pub_date = digest
        .published_at
        .map(|instant| format_pub_date(instant, tz));

    let itunes_item_ext = ITunesItemExtensionBuilder::default()
        .duration(Some(format_itunes_duration(duration_seconds)))
        .summary(Some(description.clone()))
        .build();

    let item = ItemBuilder::default()
        .title(Some(title))
        .description(Some(description))
        .enclosure(Some(enclosure))
        .guid(Some(guid))
        .pub_date(pub_date)
        .itunes_ext(Some(itunes_item_ext))
        .build();

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use feedcast_common::types::Digest;

    fn settings() -> RssSettings {
        RssSettings {
            rss_edge_cache_seconds: 300,
            rss_swr_seconds: 600,
            channel_title: "Feedcast Daily".to_string(),
            channel_description: "Topic-scoped daily digests".to_string(),
            owner_email: "owner@example.com".to_string(),
            image_url: "https://example.com/cover.png".to_string(),
        }
    }

    fn published_digest(id: i64, topic: &str, artifact_url: Option<&str>) -> PublishedDigest {
        PublishedDigest {
            digest: Digest {
                id,
                topic_id: 1,
                digest_date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
                script_content: "script".to_string(),
                episode_ids: vec![1, 2],
                mp3_path: None,
                mp3_duration_seconds: Some(185.0),
                mp3_title: Some("AI Daily Digest".to_string()),
                mp3_summary: Some("Today's top AI stories.".to_string()),
                mp3_size_bytes: Some(4_200_000),
                artifact_url: artifact_url.map(str::to_string),
                published_at: Some(Utc.with_ymd_and_hms(2026, 3, 5, 13, 0, 0).unwrap()),
                generated_at: Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
            },
            topic_name: topic.to_string(),
        }
    }

    #[test]
    fn renders_one_item_per_published_digest() {
        let published = vec![published_digest(1, "AI", Some("https://cdn.example.com/ai.mp3"))];
        let channel = build_channel(&published, &settings(), chrono_tz::UTC).unwrap();
        assert_eq!(channel.items().len(), 1);
        let item = &channel.items()[0];
        assert_eq!(item.enclosure().unwrap().url(), "https://cdn.example.com/ai.mp3");
        assert_eq!(item.guid().unwrap().value(), "ai-2026-03-05");
        assert!(!item.guid().unwrap().is_permalink());
    }

    #[test]
    fn missing_artifact_url_is_a_render_error() {
        let published = vec![published_digest(1, "AI", None)];
        let result = build_channel(&published, &settings(), chrono_tz::UTC);
        assert!(result.is_err());
    }

    #[test]
    fn itunes_duration_reflects_mp3_duration_seconds() {
        let published = vec![published_digest(1, "AI", Some("https://cdn.example.com/ai.mp3"))];
        let channel = build_channel(&published, &settings(), chrono_tz::UTC).unwrap();
        let ext = channel.items()[0].itunes_ext().unwrap();
        assert_eq!(ext.duration().unwrap(), "00:03:05");
    }
}
