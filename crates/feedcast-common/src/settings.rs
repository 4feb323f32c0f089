//! The typed snapshot of every tunable loaded from the settings store
//!. `feedcast-store` owns the actual loading (it is the crate
//! that talks to Postgres); this struct is shared so every other crate can
//! depend on a `Settings` value without depending on `feedcast-store`.
//!
//! Every field here is mandatory. A tunable absent from the settings store
//! is a `ConfigMissing` error at load time, never a default substituted at
//! use time — the loader is the only place that is allowed to notice an
//! absence.

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub content_filtering: ContentFiltering,
    pub audio_processing: AudioProcessing,
    pub pipeline: Pipeline,
    pub retention: Retention,
    pub ai_content_scoring: AiContentScoring,
    pub ai_digest_generation: AiDigestGeneration,
    pub ai_metadata_generation: AiMetadataGeneration,
    pub tts_generation: TtsGeneration,
    pub publishing: Publishing,
    pub rss: Rss,
    pub discovery: Discovery,
    pub display_timezone: chrono_tz::Tz,
}

/// A tunable with an explicit default, absent from the mandatory
/// settings table.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub feed_deactivation_threshold: i32,
}

impl Default for Discovery {
    fn default() -> Self {
        Discovery {
            feed_deactivation_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentFiltering {
    pub score_threshold: f64,
    pub max_episodes_per_digest: i64,
    /// Reserved; currently unenforced.
    pub min_episodes_per_digest: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioProcessing {
    pub chunk_duration_minutes: i64,
    /// `0` = unbounded.
    pub max_chunks_per_episode: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub max_episodes_per_run: i64,
    pub audio_max_workers: usize,
    pub tts_max_workers: usize,
    pub processing_timeout_minutes: i64,
    pub discovery_lookback_hours: i64,
    pub ad_trim_fraction: f64,
    /// Cap on `failure_count` before an episode's hard failure becomes
    /// permanent. Not enumerated in the mandatory settings table;
    /// defaults rather than fails closed (see DESIGN.md).
    pub max_retries: i64,
}

/// Tunables absent from the mandatory settings table, carrying their
/// own stated defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Publishing {
    pub publish_max_retries: i64,
}

/// `rss_edge_cache_seconds` and `rss_swr_seconds` carry their own stated
/// defaults; the channel metadata fields have no stated default and are
/// fatal if absent, like every other mandatory tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct Rss {
    pub rss_edge_cache_seconds: i64,
    pub rss_swr_seconds: i64,
    pub channel_title: String,
    pub channel_description: String,
    pub owner_email: String,
    pub image_url: String,
}

impl Default for Publishing {
    fn default() -> Self {
        Publishing {
            publish_max_retries: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Retention {
    pub local_mp3_days: i64,
    pub audio_cache_days: i64,
    pub logs_days: i64,
    pub github_release_days: i64,
    pub episode_retention_days: i64,
    pub digest_retention_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiContentScoring {
    pub model: String,
    pub max_tokens: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiDigestGeneration {
    pub model: String,
    pub max_output_tokens: i64,
    pub max_input_tokens: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiMetadataGeneration {
    pub model: String,
    pub max_title_tokens: i64,
    pub max_summary_tokens: i64,
    pub max_description_tokens: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TtsGeneration {
    pub model: String,
    pub max_characters: i64,
}
