//! Loads the `web_settings` table into a typed `Settings` snapshot. A
//! tunable absent from the table is `ConfigMissing`; nothing here ever
//! substitutes a default for a row marked fatal-if-absent. The three
//! settings with a stated numeric default (`publish_max_retries`,
//! `rss_edge_cache_seconds`, `rss_swr_seconds`) are the sole exception.

use std::collections::HashMap;
use std::str::FromStr;

use feedcast_common::settings::{
    AiContentScoring, AiDigestGeneration, AiMetadataGeneration, AudioProcessing, ContentFiltering,
    Discovery, Pipeline, Publishing, Retention, Rss, Settings, TtsGeneration,
};
use sqlx::PgPool;

use crate::error::{Result, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct SettingRow {
    category: String,
    key: String,
    value_text: String,
}

pub async fn load_settings(pool: &PgPool) -> Result<Settings> {
    let rows = sqlx::query_as::<_, SettingRow>(
        "SELECT category, key, value_text FROM web_settings",
    )
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<(String, String), String> = HashMap::new();
    for row in rows {
        map.insert((row.category, row.key), row.value_text);
    }

    let required = |category: &str, key: &str| -> Result<String> {
        map.get(&(category.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::ConfigMissing {
                category: category.to_string(),
                key: key.to_string(),
            })
    };

    let required_parsed = |category: &str, key: &str| -> Result<i64> {
        let raw = required(category, key)?;
        raw.parse().map_err(|_| StoreError::ConfigMalformed {
            category: category.to_string(),
            key: key.to_string(),
            value: raw,
        })
    };

    let required_float = |category: &str, key: &str| -> Result<f64> {
        let raw = required(category, key)?;
        raw.parse().map_err(|_| StoreError::ConfigMalformed {
            category: category.to_string(),
            key: key.to_string(),
            value: raw,
        })
    };

    let optional_parsed_or = |category: &str, key: &str, default: i64| -> i64 {
        map.get(&(category.to_string(), key.to_string()))
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };

    let content_filtering = ContentFiltering {
        score_threshold: required_float("content_filtering", "score_threshold")?,
        max_episodes_per_digest: required_parsed("content_filtering", "max_episodes_per_digest")?,
        min_episodes_per_digest: required_parsed("content_filtering", "min_episodes_per_digest")?,
    };

    let audio_processing = AudioProcessing {
        chunk_duration_minutes: required_parsed("audio_processing", "chunk_duration_minutes")?,
        max_chunks_per_episode: required_parsed("audio_processing", "max_chunks_per_episode")?,
    };

    let pipeline = Pipeline {
        max_episodes_per_run: required_parsed("pipeline", "max_episodes_per_run")?,
        audio_max_workers: required_parsed("pipeline", "audio_max_workers")? as usize,
        tts_max_workers: required_parsed("pipeline", "tts_max_workers")? as usize,
        processing_timeout_minutes: required_parsed("pipeline", "processing_timeout_minutes")?,
        discovery_lookback_hours: required_parsed("pipeline", "discovery_lookback_hours")?,
        ad_trim_fraction: required_float("pipeline", "ad_trim_fraction")?,
        max_retries: optional_parsed_or("pipeline", "max_retries", 3),
    };

    let retention = Retention {
        local_mp3_days: required_parsed("retention", "local_mp3_days")?,
        audio_cache_days: required_parsed("retention", "audio_cache_days")?,
        logs_days: required_parsed("retention", "logs_days")?,
        github_release_days: required_parsed("retention", "github_release_days")?,
        episode_retention_days: required_parsed("retention", "episode_retention_days")?,
        digest_retention_days: required_parsed("retention", "digest_retention_days")?,
    };

    let ai_content_scoring = AiContentScoring {
        model: required("ai_content_scoring", "model")?,
        max_tokens: required_parsed("ai_content_scoring", "max_tokens")?,
    };

    let ai_digest_generation = AiDigestGeneration {
        model: required("ai_digest_generation", "model")?,
        max_output_tokens: required_parsed("ai_digest_generation", "max_output_tokens")?,
        max_input_tokens: required_parsed("ai_digest_generation", "max_input_tokens")?,
    };

    let ai_metadata_generation = AiMetadataGeneration {
        model: required("ai_metadata_generation", "model")?,
        max_title_tokens: required_parsed("ai_metadata_generation", "max_title_tokens")?,
        max_summary_tokens: required_parsed("ai_metadata_generation", "max_summary_tokens")?,
        max_description_tokens: required_parsed("ai_metadata_generation", "max_description_tokens")?,
    };

    let tts_generation = TtsGeneration {
        model: required("tts_generation", "model")?,
        max_characters: required_parsed("tts_generation", "max_characters")?,
    };

    let publishing = Publishing {
        publish_max_retries: optional_parsed_or("publishing", "publish_max_retries", 5),
    };

    let rss = Rss {
        rss_edge_cache_seconds: optional_parsed_or("rss", "rss_edge_cache_seconds", 300),
        rss_swr_seconds: optional_parsed_or("rss", "rss_swr_seconds", 600),
        channel_title: required("rss", "channel_title")?,
        channel_description: required("rss", "channel_description")?,
        owner_email: required("rss", "owner_email")?,
        image_url: required("rss", "image_url")?,
    };

    let discovery = Discovery {
        feed_deactivation_threshold: optional_parsed_or("discovery", "feed_deactivation_threshold", 3) as i32,
    };

    let display_timezone_raw = required("general", "display_timezone")?;
    let display_timezone = chrono_tz::Tz::from_str(&display_timezone_raw).map_err(|_| {
        StoreError::ConfigMalformed {
            category: "general".to_string(),
            key: "display_timezone".to_string(),
            value: display_timezone_raw,
        }
    })?;

    Ok(Settings {
        content_filtering,
        audio_processing,
        pipeline,
        retention,
        ai_content_scoring,
        ai_digest_generation,
        ai_metadata_generation,
        tts_generation,
        publishing,
        rss,
        discovery,
        display_timezone,
    })
}
