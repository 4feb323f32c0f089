//! Audio phase: claim pending episodes, download, chunk,
//! transcribe (via the memory-bounded protocol in `feedcast-audio`),
//! score, and transition to `scored`/`not_relevant`/`failed`.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use feedcast_ai::ScoringTopic;
use feedcast_audio::{AudioError, TranscriptSink};
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::error::PipelineError;
use crate::report::{PhaseName, PhaseReport};
use crate::text::trim_ad_fraction;

/// Adapts `feedcast-store::episodes`'s chunk-append/finalize calls to the
/// `TranscriptSink` boundary the chunked-transcription protocol writes
/// through. `feedcast-audio` stays free of a `feedcast-store` dependency;
/// this is the one piece of glue that closes the loop.
struct StoreTranscriptSink {
    pool: PgPool,
}

#[async_trait]
impl TranscriptSink for StoreTranscriptSink {
    async fn append_chunk(&self, episode_guid: &str, _chunk_number: i64, text: &str) -> Result<(), AudioError> {
        feedcast_store::episodes::append_transcript_chunk(&self.pool, episode_guid, text)
            .await
            .map_err(|e| AudioError::Other(e.into()))
    }

    async fn finalize(&self, episode_guid: &str, word_count: i64) -> Result<(), AudioError> {
        feedcast_store::episodes::finalize_transcript_by_guid(&self.pool, episode_guid, word_count)
            .await
            .map_err(|e| AudioError::Other(e.into()))
    }
}

pub async fn run_audio(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Audio, started_at);

    let recovered =
        feedcast_store::episodes::recover_stuck_processing(&ctx.pool, ctx.settings.pipeline.processing_timeout_minutes)
            .await?;
    if recovered > 0 {
        info!(recovered, "reset stuck processing episodes back to pending");
    }
    report.counts.insert("recovered_stuck".to_string(), recovered as i64);

    let ids = feedcast_store::episodes::list_claimable_ids(&ctx.pool, ctx.audio_limit()).await?;

    if ctx.dry_run {
        report.counts.insert("would_process".to_string(), ids.len() as i64);
        report.ended_at = Utc::now();
        return Ok(report);
    }

    let topics = feedcast_store::topics::list_active(&ctx.pool).await?;
    let scoring_topics: Vec<ScoringTopic> = topics
        .iter()
        .map(|t| ScoringTopic {
            name: t.name.clone(),
            instructions_md: t.instructions_md.clone(),
        })
        .collect();

    let workers = ctx.settings.pipeline.audio_max_workers.max(1);
    let results: Vec<(i64, Result<String, String>)> = stream::iter(ids)
        .map(|episode_id| {
            let scoring_topics = scoring_topics.clone();
            async move {
                let outcome = process_one(ctx, deps, episode_id, &scoring_topics).await;
                (episode_id, outcome)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    for (episode_id, outcome) in results {
        match outcome {
            Ok(status) => {
                report.increment(&format!("status[{status}]"));
            }
            Err(reason) => {
                report.record_failure(episode_id.to_string(), reason);
                report.increment("status[failed_or_retried]");
            }
        }
    }

    report.ended_at = Utc::now();
    info!(processed = report.counts.values().sum::<i64>(), "audio phase complete");
    Ok(report)
}

/// Processes a single episode end to end: claim, download, chunk,
/// transcribe, score, transition. Returns the terminal status name on
/// success, or a short failure reason string (the episode row itself has
/// already been transitioned to `failed`/`pending` by this point).
async fn process_one(
    ctx: &RunContext,
    deps: &PipelineDeps,
    episode_id: i64,
    scoring_topics: &[ScoringTopic],
) -> Result<String, String> {
    let claimed = feedcast_store::episodes::try_claim(&ctx.pool, episode_id)
        .await
        .map_err(|e| e.to_string())?;
    if !claimed {
        return Err("lost claim race".to_string());
    }

    match process_claimed(ctx, deps, episode_id, scoring_topics).await {
        Ok(status) => Ok(status),
        Err(e) => {
            let new_status = feedcast_store::episodes::mark_failed_or_retry(
                &ctx.pool,
                episode_id,
                &e.to_string(),
                ctx.settings.pipeline.max_retries,
            )
            .await
            .map_err(|db_err| db_err.to_string())?;
            warn!(episode_id, status = %new_status, error = %e, "audio processing failed");
            Err(e.to_string())
        }
    }
}

async fn process_claimed(
    ctx: &RunContext,
    deps: &PipelineDeps,
    episode_id: i64,
    scoring_topics: &[ScoringTopic],
) -> Result<String, PipelineError> {
    let episode = feedcast_store::episodes::get(&ctx.pool, episode_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("episode {episode_id} vanished after claim"))?;

    let work_dir = ctx.staging_dir.join("audio").join(episode_id.to_string());
    tokio::fs::create_dir_all(&work_dir).await.map_err(AudioError::Io)?;
    let source_path = work_dir.join("source.audio");

    // Guarantees chunk files and the source download are always reclaimed,
    // success or failure.
    let result = run_pipeline_steps(ctx, deps, &episode, &source_path, &work_dir, scoring_topics).await;
    let _ = tokio::fs::remove_dir_all(&work_dir).await;
    result
}

async fn run_pipeline_steps(
    ctx: &RunContext,
    deps: &PipelineDeps,
    episode: &feedcast_common::types::Episode,
    source_path: &Path,
    work_dir: &Path,
    scoring_topics: &[ScoringTopic],
) -> Result<String, PipelineError> {
    deps.audio_downloader.download(&episode.audio_url, source_path).await?;

    let chunk_dir = work_dir.join("chunks");
    let chunks = deps
        .audio_chunker
        .chunk(
            source_path,
            &chunk_dir,
            ctx.settings.audio_processing.chunk_duration_minutes,
            ctx.settings.audio_processing.max_chunks_per_episode,
        )
        .await?;

    let sink = StoreTranscriptSink { pool: ctx.pool.clone() };
    feedcast_audio::transcribe_episode(deps.transcriber.as_ref(), &sink, &episode.episode_guid, &chunks).await?;

    let transcribed = feedcast_store::episodes::get(&ctx.pool, episode.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("episode {} vanished after transcription", episode.id))?;
    let transcript = transcribed.transcript_text.unwrap_or_default();
    let trimmed = trim_ad_fraction(&transcript, ctx.settings.pipeline.ad_trim_fraction);

    let scores = deps
        .content_scorer
        .score(
            trimmed,
            scoring_topics,
            &ctx.settings.ai_content_scoring.model,
            ctx.settings.ai_content_scoring.max_tokens,
        )
        .await?;

    let status = feedcast_store::episodes::apply_scores(
        &ctx.pool,
        episode.id,
        &scores,
        ctx.settings.content_filtering.score_threshold,
    )
    .await?;

    Ok(status.to_string())
}
