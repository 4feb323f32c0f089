//! TTS phase: synthesize each ready digest's script to MP3
//! via the atomic write protocol (`feedcast_tts::stage_audio`), generate
//! best-effort metadata, and commit `mp3_path`/duration/title/summary.

use chrono::Utc;
use feedcast_tts::TtsError;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::error::PipelineError;
use crate::report::{PhaseName, PhaseReport};
use crate::text::{fallback_title, slugify};

pub async fn run_tts(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Tts, started_at);

    let digests = feedcast_store::digests::list_ready_for_tts(&ctx.pool, ctx.today()).await?;

    if ctx.dry_run {
        report.counts.insert("would_synthesize".to_string(), digests.len() as i64);
        report.ended_at = Utc::now();
        return Ok(report);
    }

    let workers = ctx.settings.pipeline.tts_max_workers.max(1);
    let results: Vec<(i64, Result<(), String>)> = stream::iter(digests)
        .map(|digest| async move {
            let digest_id = digest.id;
            (digest_id, process_one(ctx, deps, digest).await.map_err(|e| e.to_string()))
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    for (digest_id, outcome) in results {
        match outcome {
            Ok(()) => report.increment("synthesized"),
            Err(reason) => {
                warn!(digest_id, error = %reason, "tts synthesis failed");
                report.record_failure(digest_id.to_string(), reason);
                report.increment("failed");
            }
        }
    }

    report.ended_at = Utc::now();
    info!(synthesized = report.counts.get("synthesized").copied().unwrap_or(0), "tts phase complete");
    Ok(report)
}

async fn process_one(ctx: &RunContext, deps: &PipelineDeps, digest: feedcast_common::types::Digest) -> Result<(), PipelineError> {
    let topic = feedcast_store::topics::get(&ctx.pool, digest.topic_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("digest {} references missing topic {}", digest.id, digest.topic_id))?;

    let max_characters = ctx.settings.tts_generation.max_characters;
    let len = digest.script_content.chars().count();
    if len as i64 > max_characters {
        return Err(TtsError::ScriptTooLong { len, max: max_characters }.into());
    }

    let is_no_content = digest.episode_ids.is_empty();

    let audio_bytes = deps
        .tts_client
        .synthesize(&digest.script_content, &topic.voice_id, &ctx.settings.tts_generation.model)
        .await?;

    let topic_slug = slugify(&topic.name);
    let now = Utc::now();
    let mp3_dir = ctx.staging_dir.join("mp3");
    tokio::fs::create_dir_all(&mp3_dir).await.map_err(TtsError::Io)?;
    let staged = feedcast_tts::stage_audio(&mp3_dir, &topic_slug, now, &audio_bytes, is_no_content).await?;

    let metadata = match deps
        .metadata_generator
        .generate_metadata(
            &topic.name,
            &digest.script_content,
            &ctx.settings.ai_metadata_generation.model,
            ctx.settings.ai_metadata_generation.max_title_tokens,
            ctx.settings.ai_metadata_generation.max_summary_tokens,
            ctx.settings.ai_metadata_generation.max_description_tokens,
        )
        .await
    {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(digest_id = digest.id, error = %e, "metadata generation failed, using deterministic fallback");
            feedcast_ai::DigestMetadata {
                title: fallback_title(&topic.name, digest.digest_date),
                summary: String::new(),
                description: String::new(),
            }
        }
    };

    feedcast_store::digests::set_mp3(
        &ctx.pool,
        digest.id,
        &staged.final_path.to_string_lossy(),
        staged.duration_seconds,
        &metadata.title,
        &metadata.summary,
    )
    .await?;

    Ok(())
}
