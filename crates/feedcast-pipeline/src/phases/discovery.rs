//! Discovery phase: fetch every active feed, upsert new
//! episodes, enforce the per-run cap and lookback window, and track each
//! feed's failure streak toward deactivation.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::report::{PhaseName, PhaseReport};

pub async fn run_discovery(ctx: &RunContext, deps: &PipelineDeps) -> Result<PhaseReport, crate::error::PipelineError> {
    let started_at = Utc::now();
    let mut report = PhaseReport::new(PhaseName::Discovery, started_at);

    let feeds = feedcast_store::feeds::list_active(&ctx.pool).await?;
    let cutoff = started_at - chrono::Duration::hours(ctx.settings.pipeline.discovery_lookback_hours);
    let cap = ctx.discovery_limit();
    let mut new_count: i64 = 0;
    let mut per_feed_new: BTreeMap<String, i64> = BTreeMap::new();

    for feed in feeds {
        if new_count >= cap {
            break;
        }

        if ctx.dry_run {
            report.increment("feeds_would_check");
            continue;
        }

        let parsed = match deps.feed_fetcher.fetch(&feed.url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                let deactivated = feedcast_store::feeds::record_fetch_failure(
                    &ctx.pool,
                    feed.id,
                    ctx.settings.discovery.feed_deactivation_threshold,
                )
                .await?;
                let title = feed.title.clone().unwrap_or_else(|| feed.url.clone());
                warn!(feed = %title, deactivated, error = %e, "feed fetch failed");
                report.record_failure(feed.url.clone(), e.to_string());
                report.increment("feeds_failed");
                continue;
            }
        };

        feedcast_store::feeds::record_fetch_success(&ctx.pool, feed.id).await?;

        let feed_label = feed.title.clone().unwrap_or_else(|| feed.url.clone());
        for episode in parsed.episodes {
            if new_count >= cap {
                break;
            }
            let published_at = episode.published_at.unwrap_or(started_at);
            if published_at < cutoff {
                continue;
            }

            let inserted = feedcast_store::episodes::insert_if_new(
                &ctx.pool,
                feed.id,
                &episode.guid,
                &episode.title,
                published_at,
                &episode.audio_url,
                episode.duration_seconds,
            )
            .await?;

            if inserted {
                new_count += 1;
                *per_feed_new.entry(feed_label.clone()).or_insert(0) += 1;
            }
        }
        report.increment("feeds_checked");
    }

    report.counts.insert("new_episodes".to_string(), new_count);
    for (feed_label, count) in per_feed_new {
        report.counts.insert(format!("new_episodes[{feed_label}]"), count);
    }
    report.ended_at = Utc::now();
    info!(new_episodes = new_count, "discovery phase complete");
    Ok(report)
}
