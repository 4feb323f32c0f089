//! Publishing phase: upload each digest's MP3 to the
//! artifact host under a daily tag, record the returned URL, and delete
//! the local file (best-effort; failure to delete does not fail the
//! phase — Retention sweeps residue).

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::error::PipelineError;
use crate::report::{PhaseName, PhaseReport};

pub async fn run_publishing(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Publishing, started_at);

    let digests = feedcast_store::digests::list_ready_for_publishing(&ctx.pool).await?;

    if ctx.dry_run {
        report.counts.insert("would_publish".to_string(), digests.len() as i64);
        report.ended_at = Utc::now();
        return Ok(report);
    }

    let workers = ctx.settings.pipeline.tts_max_workers.max(1);
    let results: Vec<(i64, Result<(), String>)> = stream::iter(digests)
        .map(|digest| async move {
            let digest_id = digest.id;
            (digest_id, publish_one(ctx, deps, digest).await.map_err(|e| e.to_string()))
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    for (digest_id, outcome) in results {
        match outcome {
            Ok(()) => report.increment("published"),
            Err(reason) => {
                warn!(digest_id, error = %reason, "publishing failed");
                report.record_failure(digest_id.to_string(), reason);
                report.increment("failed");
            }
        }
    }

    report.ended_at = Utc::now();
    info!(published = report.counts.get("published").copied().unwrap_or(0), "publishing phase complete");
    Ok(report)
}

async fn publish_one(ctx: &RunContext, deps: &PipelineDeps, digest: feedcast_common::types::Digest) -> Result<(), PipelineError> {
    let mp3_path = digest
        .mp3_path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("digest {} has no mp3_path", digest.id))?;
    let local_path = std::path::Path::new(&mp3_path);
    if !local_path.exists() {
        return Err(anyhow::anyhow!("mp3 {mp3_path} for digest {} does not exist on disk", digest.id).into());
    }

    let tag_name = format!("daily-{}", digest.digest_date.format("%Y-%m-%d"));

    let tag = retry_with_backoff(ctx.settings.publishing.publish_max_retries, || async {
        deps.artifact_host.ensure_tag(&tag_name).await
    })
    .await?;

    let content_type: mime::Mime = "audio/mpeg".parse().expect("audio/mpeg is a valid mime type");
    let asset = retry_with_backoff(ctx.settings.publishing.publish_max_retries, || async {
        deps.artifact_host.upload_asset(&tag, local_path, content_type.clone()).await
    })
    .await?;

    feedcast_store::digests::mark_published(&ctx.pool, digest.id, &asset.url, asset.size_bytes as i64, Utc::now()).await?;

    if let Err(e) = tokio::fs::remove_file(local_path).await {
        warn!(digest_id = digest.id, path = %mp3_path, error = %e, "failed to delete local mp3 after publish");
    }

    Ok(())
}

/// Exponential backoff bounded by `max_retries`, grounded in the same `Transient`-only retry policy every
/// other external boundary in this workspace follows.
async fn retry_with_backoff<T, F, Fut>(max_retries: i64, mut operation: F) -> Result<T, feedcast_artifacts::ArtifactError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, feedcast_artifacts::ArtifactError>>,
{
    use feedcast_common::error::Classify;

    let mut attempt: i64 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.kind().is_retryable() && attempt < max_retries => {
                attempt += 1;
                let backoff_ms = 200u64.saturating_mul(1u64 << attempt.min(6) as u32);
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
