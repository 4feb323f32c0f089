//! sqlx row types. Kept distinct from `feedcast_common::types` entities —
//! the row type owns the wire-format detail (status as `String`, jsonb as
//! `serde_json::Value`) and converts into the plain domain struct.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use feedcast_common::types::{Digest, Episode, EpisodeStatus, Feed, Topic};

use crate::error::{Result, StoreError};

#[derive(Debug, sqlx::FromRow)]
pub struct FeedRow {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub active: bool,
    pub consecutive_failure_count: i32,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            url: row.url,
            title: row.title,
            active: row.active,
            consecutive_failure_count: row.consecutive_failure_count,
            last_checked_at: row.last_checked_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct EpisodeRow {
    pub id: i64,
    pub feed_id: i64,
    pub episode_guid: String,
    pub title: String,
    pub published_date: DateTime<Utc>,
    pub audio_url: String,
    pub duration_seconds: Option<i64>,
    pub status: String,
    pub transcript_text: Option<String>,
    pub scores: Option<serde_json::Value>,
    pub word_count: Option<i64>,
    pub failure_count: i32,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EpisodeRow> for Episode {
    type Error = StoreError;

    fn try_from(row: EpisodeRow) -> Result<Self> {
        let status = EpisodeStatus::from_str(&row.status).map_err(|_| StoreError::ConfigMalformed {
            category: "episodes".to_string(),
            key: "status".to_string(),
            value: row.status.clone(),
        })?;
        let scores = row
            .scores
            .map(|v| serde_json::from_value::<HashMap<String, f64>>(v))
            .transpose()
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Episode {
            id: row.id,
            feed_id: row.feed_id,
            episode_guid: row.episode_guid,
            title: row.title,
            published_date: row.published_date,
            audio_url: row.audio_url,
            duration_seconds: row.duration_seconds,
            status,
            transcript_text: row.transcript_text,
            scores,
            word_count: row.word_count,
            failure_count: row.failure_count,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct TopicRow {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub voice_id: String,
    pub instructions_md: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl From<TopicRow> for Topic {
    fn from(row: TopicRow) -> Self {
        Topic {
            id: row.id,
            name: row.name,
            active: row.active,
            voice_id: row.voice_id,
            instructions_md: row.instructions_md,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct DigestRow {
    pub id: i64,
    pub topic_id: i64,
    pub digest_date: NaiveDate,
    pub script_content: String,
    pub episode_ids: serde_json::Value,
    pub mp3_path: Option<String>,
    pub mp3_duration_seconds: Option<f64>,
    pub mp3_title: Option<String>,
    pub mp3_summary: Option<String>,
    pub mp3_size_bytes: Option<i64>,
    pub artifact_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl TryFrom<DigestRow> for Digest {
    type Error = StoreError;

    fn try_from(row: DigestRow) -> Result<Self> {
        let episode_ids: Vec<i64> =
            serde_json::from_value(row.episode_ids).map_err(|e| anyhow::anyhow!(e))?;
        Ok(Digest {
            id: row.id,
            topic_id: row.topic_id,
            digest_date: row.digest_date,
            script_content: row.script_content,
            episode_ids,
            mp3_path: row.mp3_path,
            mp3_duration_seconds: row.mp3_duration_seconds,
            mp3_title: row.mp3_title,
            mp3_summary: row.mp3_summary,
            mp3_size_bytes: row.mp3_size_bytes,
            artifact_url: row.artifact_url,
            published_at: row.published_at,
            generated_at: row.generated_at,
        })
    }
}
