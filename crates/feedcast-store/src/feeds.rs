use feedcast_common::types::Feed;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::FeedRow;

pub async fn list_active(pool: &PgPool) -> Result<Vec<Feed>> {
    let rows = sqlx::query_as::<_, FeedRow>(
        "SELECT id, url, title, active, consecutive_failure_count, last_checked_at
         FROM feeds WHERE active = true ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Feed::from).collect())
}

/// Resets the failure streak and bumps `last_checked_at` after a
/// successful fetch.
pub async fn record_fetch_success(pool: &PgPool, feed_id: i64) -> Result<()> {
    sqlx::query(
        "UPDATE feeds SET consecutive_failure_count = 0, last_checked_at = now(), updated_at = now()
         WHERE id = $1",
    )
    .bind(feed_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Increments the failure streak and deactivates the feed once it
/// exceeds `feed_deactivation_threshold`.
/// Returns `true` if the feed was deactivated by this call.
pub async fn record_fetch_failure(pool: &PgPool, feed_id: i64, deactivation_threshold: i32) -> Result<bool> {
    let failure_count: i32 = sqlx::query_scalar(
        "UPDATE feeds SET consecutive_failure_count = consecutive_failure_count + 1,
         last_checked_at = now(), updated_at = now()
         WHERE id = $1
         RETURNING consecutive_failure_count",
    )
    .bind(feed_id)
    .fetch_one(pool)
    .await?;

    if failure_count > deactivation_threshold {
        sqlx::query("UPDATE feeds SET active = false, updated_at = now() WHERE id = $1")
            .bind(feed_id)
            .execute(pool)
            .await?;
        return Ok(true);
    }
    Ok(false)
}
