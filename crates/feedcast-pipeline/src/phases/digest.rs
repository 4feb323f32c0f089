//! Digest phase: per active topic, select qualifying
//! episodes, generate a script (or a no-content script), upsert the
//! day's Digest row, then mark every referenced episode `digested` only
//! after all topics have been processed (deferred marking, step 6).

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::error::PipelineError;
use crate::report::{PhaseName, PhaseReport};
use crate::text::{no_content_script, truncate_transcripts_to_budget};

pub async fn run_digest(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Digest, started_at);

    let topics = feedcast_store::topics::list_active(&ctx.pool).await?;
    let today = ctx.today();
    let mut digested_episode_ids: BTreeSet<i64> = BTreeSet::new();

    for topic in topics {
        if ctx.dry_run {
            report.increment("topics_would_process");
            continue;
        }

        let qualifying = feedcast_store::episodes::qualifying_for_topic(
            &ctx.pool,
            &topic.name,
            ctx.settings.content_filtering.score_threshold,
        )
        .await?;

        let selected: Vec<_> = qualifying.into_iter().take(ctx.digest_limit() as usize).collect();

        let script = if selected.is_empty() {
            no_content_script(&topic.name)
        } else {
            let raw_transcripts: Vec<String> = selected
                .iter()
                .map(|e| e.transcript_text.clone().unwrap_or_default())
                .collect();
            let transcripts = truncate_transcripts_to_budget(
                &raw_transcripts,
                ctx.settings.ai_digest_generation.max_input_tokens,
            );

            match deps
                .script_generator
                .generate_script(
                    &topic.name,
                    &topic.instructions_md,
                    &transcripts,
                    &ctx.settings.ai_digest_generation.model,
                    ctx.settings.ai_digest_generation.max_output_tokens,
                )
                .await
            {
                Ok(script) => script,
                Err(e) => {
                    warn!(topic = %topic.name, error = %e, "script generation failed");
                    report.record_failure(topic.name.clone(), e.to_string());
                    report.increment("topics_failed");
                    continue;
                }
            }
        };

        let episode_ids: Vec<i64> = selected.iter().map(|e| e.id).collect();
        feedcast_store::digests::upsert(&ctx.pool, topic.id, today, &script, &episode_ids).await?;
        digested_episode_ids.extend(episode_ids.iter().copied());

        report.increment("topics_processed");
        report.counts.insert(
            format!("selected_episodes[{}]", topic.name),
            episode_ids.len() as i64,
        );
    }

    if !ctx.dry_run && !digested_episode_ids.is_empty() {
        let ids: Vec<i64> = digested_episode_ids.into_iter().collect();
        feedcast_store::episodes::mark_digested(&ctx.pool, &ids).await?;
        report.counts.insert("episodes_digested".to_string(), ids.len() as i64);
    }

    report.ended_at = Utc::now();
    info!(topics = report.counts.get("topics_processed").copied().unwrap_or(0), "digest phase complete");
    Ok(report)
}
