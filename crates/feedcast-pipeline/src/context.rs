//! The per-run context the orchestrator threads through every phase:
//! optional episode/digest caps per phase (for testing), a verbose flag,
//! and a dry-run flag.

use std::path::PathBuf;

use chrono::NaiveDate;
use feedcast_common::settings::Settings;
use sqlx::PgPool;

/// Per-phase episode/digest caps, for testing. `None` means
/// "use the configured `Settings` value for that phase".
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseLimits {
    pub discovery: Option<i64>,
    pub audio: Option<i64>,
    pub digest: Option<i64>,
    pub tts: Option<i64>,
    pub publishing: Option<i64>,
}

pub struct RunContext {
    pub pool: PgPool,
    pub settings: Settings,
    pub dry_run: bool,
    pub verbose: bool,
    pub limits: PhaseLimits,
    /// Local staging directory for chunked audio and synthesized MP3s
    /// before they are uploaded. Partitioned by
    /// episode/digest id beneath this root so no two workers write the
    /// same path.
    pub staging_dir: PathBuf,
}

impl RunContext {
    /// "Today" in the configured display timezone, used to key Digest rows and staging filenames.
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.settings.display_timezone).date_naive()
    }

    pub fn audio_limit(&self) -> i64 {
        self.limits.audio.unwrap_or(self.settings.pipeline.max_episodes_per_run)
    }

    pub fn discovery_limit(&self) -> i64 {
        self.limits.discovery.unwrap_or(self.settings.pipeline.max_episodes_per_run)
    }

    pub fn digest_limit(&self) -> i64 {
        self.limits.digest.unwrap_or(self.settings.content_filtering.max_episodes_per_digest)
    }
}
