use chrono::{DateTime, NaiveDate, Utc};
use feedcast_common::types::Digest;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::DigestRow;

const DIGEST_ROW_COLUMNS: &str = "id, topic_id, digest_date, script_content, episode_ids,
     mp3_path, mp3_duration_seconds, mp3_title, mp3_summary, mp3_size_bytes, artifact_url, published_at, generated_at";

/// Creates or replaces today's digest for a topic: a conflicting
/// `(topic, date)` row is updated in place so re-runs within the same
/// day stay idempotent.
pub async fn upsert(
    pool: &PgPool,
    topic_id: i64,
    digest_date: NaiveDate,
    script_content: &str,
    episode_ids: &[i64],
) -> Result<i64> {
    let episode_ids_json = serde_json::to_value(episode_ids).map_err(|e| anyhow::anyhow!(e))?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO digests (topic_id, digest_date, script_content, episode_ids)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (topic_id, digest_date) DO UPDATE
             SET script_content = EXCLUDED.script_content, episode_ids = EXCLUDED.episode_ids
         RETURNING id",
    )
    .bind(topic_id)
    .bind(digest_date)
    .bind(script_content)
    .bind(episode_ids_json)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Digests created today with a script but no MP3 yet.
pub async fn list_ready_for_tts(pool: &PgPool, today: NaiveDate) -> Result<Vec<Digest>> {
    let rows = sqlx::query_as::<_, DigestRow>(&format!(
        "SELECT {DIGEST_ROW_COLUMNS} FROM digests
         WHERE digest_date = $1 AND script_content != '' AND artifact_url IS NULL AND mp3_path IS NULL"
    ))
    .bind(today)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Digest::try_from).collect()
}

/// Writes the result of the atomic TTS write protocol's filesystem half:
/// `mp3_path`, `mp3_duration`, `mp3_title`, `mp3_summary` in a single
/// statement, called only after the rename to the final staging path
/// succeeds.
pub async fn set_mp3(
    pool: &PgPool,
    digest_id: i64,
    mp3_path: &str,
    mp3_duration_seconds: f64,
    mp3_title: &str,
    mp3_summary: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE digests SET mp3_path = $2, mp3_duration_seconds = $3, mp3_title = $4, mp3_summary = $5
         WHERE id = $1",
    )
    .bind(digest_id)
    .bind(mp3_path)
    .bind(mp3_duration_seconds)
    .bind(mp3_title)
    .bind(mp3_summary)
    .execute(pool)
    .await?;
    Ok(())
}

/// Digests with a materialized MP3 awaiting publication.
pub async fn list_ready_for_publishing(pool: &PgPool) -> Result<Vec<Digest>> {
    let rows = sqlx::query_as::<_, DigestRow>(&format!(
        "SELECT {DIGEST_ROW_COLUMNS} FROM digests WHERE mp3_path IS NOT NULL AND artifact_url IS NULL"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Digest::try_from).collect()
}

/// Publishes a digest: sets `artifact_url`/`mp3_size_bytes`/`published_at`
/// and clears `mp3_path`. `size_bytes` backs the RSS enclosure's `length` attribute.
pub async fn mark_published(
    pool: &PgPool,
    digest_id: i64,
    artifact_url: &str,
    size_bytes: i64,
    published_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE digests SET artifact_url = $2, mp3_size_bytes = $3, published_at = $4, mp3_path = NULL
         WHERE id = $1",
    )
    .bind(digest_id)
    .bind(artifact_url)
    .bind(size_bytes)
    .bind(published_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// All published digests, newest first.
pub async fn list_published(pool: &PgPool) -> Result<Vec<Digest>> {
    let rows = sqlx::query_as::<_, DigestRow>(&format!(
        "SELECT {DIGEST_ROW_COLUMNS} FROM digests WHERE artifact_url IS NOT NULL ORDER BY published_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Digest::try_from).collect()
}

/// A published digest paired with its topic's name and slug, which the
/// RSS item's `<guid>` and channel grouping need but aren't columns on
/// `digests` itself.
#[derive(Debug, Clone)]
pub struct PublishedDigest {
    pub digest: Digest,
    pub topic_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PublishedDigestRow {
    id: i64,
    topic_id: i64,
    digest_date: NaiveDate,
    script_content: String,
    episode_ids: serde_json::Value,
    mp3_path: Option<String>,
    mp3_duration_seconds: Option<f64>,
    mp3_title: Option<String>,
    mp3_summary: Option<String>,
    mp3_size_bytes: Option<i64>,
    artifact_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    generated_at: DateTime<Utc>,
    topic_name: String,
}

/// All published digests joined with their topic's name, newest first.
/// The RSS generator's sole read against the State Store.
pub async fn list_published_with_topic(pool: &PgPool) -> Result<Vec<PublishedDigest>> {
    let rows = sqlx::query_as::<_, PublishedDigestRow>(
        "SELECT d.id, d.topic_id, d.digest_date, d.script_content, d.episode_ids,
                d.mp3_path, d.mp3_duration_seconds, d.mp3_title, d.mp3_summary, d.mp3_size_bytes,
                d.artifact_url, d.published_at, d.generated_at, t.name AS topic_name
         FROM digests d
         JOIN topics t ON t.id = d.topic_id
         WHERE d.artifact_url IS NOT NULL
         ORDER BY d.published_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let episode_ids: Vec<i64> =
                serde_json::from_value(row.episode_ids).map_err(|e| anyhow::anyhow!(e))?;
            Ok(PublishedDigest {
                digest: Digest {
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
                },
                topic_name: row.topic_name,
            })
        })
        .collect()
}

/// Deletes digests older than the retention window, measured against
/// `digest_date`.
pub async fn delete_older_than(pool: &PgPool, cutoff: NaiveDate) -> Result<u64> {
    let result = sqlx::query("DELETE FROM digests WHERE digest_date < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
