//! Retention phase: unconditional cleanup in a fixed order — artifact
//! host cleanup before digest-row cleanup, episode-row cleanup after
//! digest-row cleanup — so an orphaned `artifact_url` never outlives its
//! own reconciliation pass.

use chrono::Utc;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::error::PipelineError;
use crate::report::{PhaseName, PhaseReport};

pub async fn run_retention(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Retention, started_at);

    sweep_staging_dir(ctx, &mut report, "local_mp3", ctx.settings.retention.local_mp3_days, "mp3").await;
    sweep_staging_dir(ctx, &mut report, "audio_cache", ctx.settings.retention.audio_cache_days, "audio").await;

    let release_cutoff = started_at - chrono::Duration::days(ctx.settings.retention.github_release_days);
    sweep_artifact_releases(ctx, deps, &mut report, release_cutoff).await?;

    let digest_cutoff = (started_at - chrono::Duration::days(ctx.settings.retention.digest_retention_days)).date_naive();
    if ctx.dry_run {
        report.increment("digests_would_delete");
    } else {
        let deleted = feedcast_store::digests::delete_older_than(&ctx.pool, digest_cutoff).await?;
        report.counts.insert("digests_deleted".to_string(), deleted as i64);
    }

    let episode_cutoff = started_at - chrono::Duration::days(ctx.settings.retention.episode_retention_days);
    if ctx.dry_run {
        report.increment("episodes_would_delete");
    } else {
        let deleted = feedcast_store::episodes::delete_older_than(&ctx.pool, episode_cutoff).await?;
        report.counts.insert("episodes_deleted".to_string(), deleted as i64);
    }

    report.ended_at = Utc::now();
    info!("retention phase complete");
    Ok(report)
}

async fn sweep_staging_dir(ctx: &RunContext, report: &mut PhaseReport, label: &str, window_days: i64, subdir: &str) {
    let dir = ctx.staging_dir.join(subdir);
    let cutoff = Utc::now() - chrono::Duration::days(window_days);

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(_) => return,
    };

    let mut swept = 0i64;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(_) => break,
        };
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        let modified: chrono::DateTime<Utc> = match metadata.modified() {
            Ok(modified) => modified.into(),
            Err(_) => continue,
        };
        if modified >= cutoff {
            continue;
        }

        if ctx.dry_run {
            swept += 1;
            continue;
        }

        let removal = if metadata.is_dir() {
            tokio::fs::remove_dir_all(entry.path()).await
        } else {
            tokio::fs::remove_file(entry.path()).await
        };
        if let Err(e) = removal {
            warn!(path = ?entry.path(), error = %e, "failed to sweep staging entry");
            continue;
        }
        swept += 1;
    }

    let key = if ctx.dry_run { format!("{label}_would_sweep") } else { format!("{label}_swept") };
    report.counts.insert(key, swept);
}

async fn sweep_artifact_releases(
    ctx: &RunContext,
    deps: &PipelineDeps,
    report: &mut PhaseReport,
    cutoff: chrono::DateTime<Utc>,
) -> Result<(), PipelineError> {
    let tags = deps.artifact_host.list_tags().await?;
    let mut swept = 0i64;

    for tag in tags {
        let Some(date) = parse_daily_tag_date(&tag) else { continue };
        if date >= cutoff.date_naive() {
            continue;
        }

        if ctx.dry_run {
            swept += 1;
            continue;
        }

        if let Err(e) = deps.artifact_host.delete_tag(&tag).await {
            warn!(tag = %tag, error = %e, "failed to delete stale artifact release");
            report.record_failure(tag, e.to_string());
            continue;
        }
        swept += 1;
    }

    let key = if ctx.dry_run { "releases_would_delete" } else { "releases_deleted" };
    report.counts.insert(key.to_string(), swept);
    Ok(())
}

fn parse_daily_tag_date(tag: &str) -> Option<chrono::NaiveDate> {
    let date_str = tag.strip_prefix("daily-")?;
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}
