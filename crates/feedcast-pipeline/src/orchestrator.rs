//! The Phase Orchestrator: runs the six phases in fixed
//! order (or a named subset), aborting downstream phases on a
//! phase-level failure except Retention, which always runs if reached.

use std::collections::BTreeSet;

use chrono::Utc;
use feedcast_common::error::Classify;
use tracing::{error, info};

use crate::context::RunContext;
use crate::deps::PipelineDeps;
use crate::phases;
use crate::report::{PhaseName, PhaseReport};

/// Runs `phases` (a subset of the six, in their fixed relative order)
/// against `ctx`/`deps`. Returns one `PhaseReport` per phase actually
/// attempted. A phase whose own run returns `Err` aborts every
/// subsequent phase except Retention.
pub async fn run(ctx: &RunContext, deps: &PipelineDeps, requested: &BTreeSet<PhaseName>) -> Vec<PhaseReport> {
    let mut reports = Vec::new();
    let mut aborted = false;

    for phase in PhaseName::ALL {
        if !requested.contains(&phase) {
            continue;
        }
        if aborted && phase != PhaseName::Retention {
            info!(phase = %phase, "skipping phase after prior phase-level abort");
            continue;
        }

        let phase_started_at = Utc::now();
        info!(phase = %phase, "starting phase");

        let outcome = match phase {
            PhaseName::Discovery => phases::run_discovery(ctx, deps).await,
            PhaseName::Audio => phases::run_audio(ctx, deps).await,
            PhaseName::Digest => phases::run_digest(ctx, deps).await,
            PhaseName::Tts => phases::run_tts(ctx, deps).await,
            PhaseName::Publishing => phases::run_publishing(ctx, deps).await,
            PhaseName::Retention => phases::run_retention(ctx, deps).await,
        };

        match outcome {
            Ok(report) => {
                info!(phase = %phase, counts = ?report.counts, item_errors = report.errors.len(), "phase complete");
                reports.push(report);
            }
            Err(e) => {
                error!(phase = %phase, error = %e, "phase aborted");
                let kind = e.kind();
                reports.push(PhaseReport::aborted(phase, phase_started_at, Utc::now(), e.to_string(), kind));
                aborted = true;
            }
        }
    }

    reports
}
