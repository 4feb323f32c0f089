use std::collections::HashMap;

use chrono::{DateTime, Utc};
use feedcast_common::types::{Episode, EpisodeStatus};
use sqlx::PgPool;

use crate::error::Result;
use crate::models::EpisodeRow;

const EPISODE_ROW_COLUMNS: &str = "id, feed_id, episode_guid, title, published_date, audio_url,
     duration_seconds, status, transcript_text, scores, word_count,
     failure_count, failure_reason, created_at, updated_at";

/// Inserts a newly-discovered episode if its `episode_guid` is not
/// already present. Returns `true` if a row was inserted.
pub async fn insert_if_new(
    pool: &PgPool,
    feed_id: i64,
    episode_guid: &str,
    title: &str,
    published_date: DateTime<Utc>,
    audio_url: &str,
    duration_seconds: Option<i64>,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO episodes (feed_id, episode_guid, title, published_date, audio_url, duration_seconds)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (episode_guid) DO NOTHING",
    )
    .bind(feed_id)
    .bind(episode_guid)
    .bind(title)
    .bind(published_date)
    .bind(audio_url)
    .bind(duration_seconds)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Resets any episode stuck in `processing` past the timeout window back
/// to `pending`. Returns the count reset.
pub async fn recover_stuck_processing(pool: &PgPool, timeout_minutes: i64) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE episodes SET status = 'pending', updated_at = now()
         WHERE status = 'processing' AND updated_at < now() - ($1 || ' minutes')::interval",
    )
    .bind(timeout_minutes.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Ids of pending episodes, oldest `published_date` first, capped at
/// `limit`.
pub async fn list_claimable_ids(pool: &PgPool, limit: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM episodes WHERE status = 'pending' ORDER BY published_date ASC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Attempts to claim a pending episode for processing. This is the sole
/// mutual-exclusion point between concurrent Audio workers:
/// the conditional `WHERE status = 'pending'` means only one concurrent
/// claim on the same id can ever succeed.
pub async fn try_claim(pool: &PgPool, episode_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE episodes SET status = 'processing', updated_at = now()
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(episode_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get(pool: &PgPool, episode_id: i64) -> Result<Option<Episode>> {
    let row = sqlx::query_as::<_, EpisodeRow>(&format!(
        "SELECT {EPISODE_ROW_COLUMNS} FROM episodes WHERE id = $1"
    ))
    .bind(episode_id)
    .fetch_optional(pool)
    .await?;

    row.map(Episode::try_from).transpose()
}

/// Appends one chunk's transcribed text to `transcript_text` in a single
/// round trip. The caller's in-process buffer holds only this one chunk's text;
/// concatenation happens in Postgres, not in the worker's memory.
pub async fn append_transcript_chunk(pool: &PgPool, episode_guid: &str, text: &str) -> Result<()> {
    sqlx::query(
        "UPDATE episodes SET transcript_text = COALESCE(transcript_text, '') || $2, updated_at = now()
         WHERE episode_guid = $1",
    )
    .bind(episode_guid)
    .bind(text)
    .execute(pool)
    .await?;
    Ok(())
}

/// `processing -> transcribed`, recording the final word count. Takes no transcript text: by this point every chunk has
/// already been appended via `append_transcript_chunk`, so there is
/// nothing left to write but the status transition and the word count.
pub async fn finalize_transcript_by_guid(pool: &PgPool, episode_guid: &str, word_count: i64) -> Result<()> {
    sqlx::query(
        "UPDATE episodes SET status = 'transcribed', word_count = $2, updated_at = now()
         WHERE episode_guid = $1",
    )
    .bind(episode_guid)
    .bind(word_count)
    .execute(pool)
    .await?;
    Ok(())
}

/// `transcribed -> scored` or `transcribed -> not_relevant` depending on
/// whether any topic score meets `score_threshold`.
pub async fn apply_scores(
    pool: &PgPool,
    episode_id: i64,
    scores: &HashMap<String, f64>,
    score_threshold: f64,
) -> Result<EpisodeStatus> {
    let qualifies = scores.values().any(|&v| v >= score_threshold);
    let status = if qualifies {
        EpisodeStatus::Scored
    } else {
        EpisodeStatus::NotRelevant
    };
    let scores_json = serde_json::to_value(scores).map_err(|e| anyhow::anyhow!(e))?;

    sqlx::query("UPDATE episodes SET status = $2, scores = $3, updated_at = now() WHERE id = $1")
        .bind(episode_id)
        .bind(status.to_string())
        .bind(scores_json)
        .execute(pool)
        .await?;

    Ok(status)
}

/// Any state -> `failed` on non-retryable error, or back to `pending` if
/// under the retry cap.
pub async fn mark_failed_or_retry(
    pool: &PgPool,
    episode_id: i64,
    reason: &str,
    max_retries: i64,
) -> Result<EpisodeStatus> {
    let failure_count: i32 = sqlx::query_scalar(
        "UPDATE episodes SET failure_count = failure_count + 1, failure_reason = $2, updated_at = now()
         WHERE id = $1 RETURNING failure_count",
    )
    .bind(episode_id)
    .bind(reason)
    .fetch_one(pool)
    .await?;

    let status = if i64::from(failure_count) >= max_retries {
        EpisodeStatus::Failed
    } else {
        EpisodeStatus::Pending
    };

    sqlx::query("UPDATE episodes SET status = $2, updated_at = now() WHERE id = $1")
        .bind(episode_id)
        .bind(status.to_string())
        .execute(pool)
        .await?;

    Ok(status)
}

/// Episodes qualifying for a topic:
/// `status = scored` and `scores[topic] >= score_threshold`, ordered by
/// that topic's score descending.
pub async fn qualifying_for_topic(
    pool: &PgPool,
    topic_name: &str,
    score_threshold: f64,
) -> Result<Vec<Episode>> {
    let rows = sqlx::query_as::<_, EpisodeRow>(&format!(
        "SELECT {EPISODE_ROW_COLUMNS} FROM episodes
         WHERE status = 'scored' AND (scores->>$1)::double precision >= $2
         ORDER BY (scores->>$1)::double precision DESC"
    ))
    .bind(topic_name)
    .bind(score_threshold)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Episode::try_from).collect()
}

/// Deferred `scored -> digested` marking after all of a day's topics
/// have been processed.
pub async fn mark_digested(pool: &PgPool, episode_ids: &[i64]) -> Result<()> {
    if episode_ids.is_empty() {
        return Ok(());
    }
    sqlx::query("UPDATE episodes SET status = 'digested', updated_at = now() WHERE id = ANY($1)")
        .bind(episode_ids)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes episodes older than the retention window, measured against
/// `published_date`. Deleting the row cascades the transcript text with it.
pub async fn delete_older_than(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM episodes WHERE published_date < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
