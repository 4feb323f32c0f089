use feedcast_common::types::Topic;
use sqlx::PgPool;

use crate::error::{Result, StoreError};
use crate::models::TopicRow;

pub async fn list_active(pool: &PgPool) -> Result<Vec<Topic>> {
    let rows = sqlx::query_as::<_, TopicRow>(
        "SELECT id, name, active, voice_id, instructions_md, description, sort_order
         FROM topics WHERE active = true ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?;

    for row in &rows {
        if row.instructions_md.trim().is_empty() {
            return Err(StoreError::ConfigMalformed {
                category: "topics".to_string(),
                key: format!("{}.instructions_md", row.name),
                value: "empty".to_string(),
            });
        }
    }

    Ok(rows.into_iter().map(Topic::from).collect())
}

pub async fn get(pool: &PgPool, topic_id: i64) -> Result<Option<Topic>> {
    let row = sqlx::query_as::<_, TopicRow>(
        "SELECT id, name, active, voice_id, instructions_md, description, sort_order
         FROM topics WHERE id = $1",
    )
    .bind(topic_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Topic::from))
}
