//! Entity types shared across crates. `feedcast-store` owns the
//! sqlx row mapping; these are the plain domain structs every other crate
//! (pipeline, rss, cli) builds against.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Episode lifecycle state. Transitions are monotonic along the
/// ordered graph except the explicit `processing -> pending` recovery and
/// the `any -> failed` escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    Pending,
    Processing,
    Transcribed,
    Scored,
    Digested,
    NotRelevant,
    Failed,
}

impl EpisodeStatus {
    pub const ALL: [EpisodeStatus; 7] = [
        EpisodeStatus::Pending,
        EpisodeStatus::Processing,
        EpisodeStatus::Transcribed,
        EpisodeStatus::Scored,
        EpisodeStatus::Digested,
        EpisodeStatus::NotRelevant,
        EpisodeStatus::Failed,
    ];

    /// `not_relevant` and `failed` are terminal; `digested` is terminal in
    /// practice (Retention deletes the row rather than transitioning it).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EpisodeStatus::NotRelevant | EpisodeStatus::Failed | EpisodeStatus::Digested
        )
    }
}

impl fmt::Display for EpisodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EpisodeStatus::Pending => "pending",
            EpisodeStatus::Processing => "processing",
            EpisodeStatus::Transcribed => "transcribed",
            EpisodeStatus::Scored => "scored",
            EpisodeStatus::Digested => "digested",
            EpisodeStatus::NotRelevant => "not_relevant",
            EpisodeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseEpisodeStatusError(pub String);

impl fmt::Display for ParseEpisodeStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid episode status: {}", self.0)
    }
}

impl std::error::Error for ParseEpisodeStatusError {}

impl FromStr for EpisodeStatus {
    type Err = ParseEpisodeStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EpisodeStatus::Pending),
            "processing" => Ok(EpisodeStatus::Processing),
            "transcribed" => Ok(EpisodeStatus::Transcribed),
            "scored" => Ok(EpisodeStatus::Scored),
            "digested" => Ok(EpisodeStatus::Digested),
            "not_relevant" => Ok(EpisodeStatus::NotRelevant),
            "failed" => Ok(EpisodeStatus::Failed),
            other => Err(ParseEpisodeStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub active: bool,
    pub consecutive_failure_count: i32,
    pub last_checked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub feed_id: i64,
    pub episode_guid: String,
    pub title: String,
    pub published_date: DateTime<Utc>,
    pub audio_url: String,
    pub duration_seconds: Option<i64>,
    pub status: EpisodeStatus,
    pub transcript_text: Option<String>,
    pub scores: Option<HashMap<String, f64>>,
    pub word_count: Option<i64>,
    pub failure_count: i32,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Episode {
    /// The highest per-topic score, or `None` if `scores` is absent/empty.
    pub fn max_score(&self) -> Option<f64> {
        self.scores
            .as_ref()
            .and_then(|s| s.values().cloned().fold(None, |acc, v| match acc {
                None => Some(v),
                Some(a) if v > a => Some(v),
                Some(a) => Some(a),
            }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub voice_id: String,
    pub instructions_md: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub id: i64,
    pub topic_id: i64,
    pub digest_date: NaiveDate,
    pub script_content: String,
    pub episode_ids: Vec<i64>,
    pub mp3_path: Option<String>,
    pub mp3_duration_seconds: Option<f64>,
    pub mp3_title: Option<String>,
    pub mp3_summary: Option<String>,
    /// Byte size of the uploaded asset, recorded at publish time.
    /// Null until `artifact_url` is set.
    pub mp3_size_bytes: Option<i64>,
    pub artifact_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl Digest {
    /// A digest is ready to publish once its mp3 has been synthesized and
    /// it has not already been published.
    pub fn is_ready_to_publish(&self) -> bool {
        self.mp3_path.is_some() && self.artifact_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_status_round_trips_through_display_and_from_str() {
        for status in EpisodeStatus::ALL {
            let parsed: EpisodeStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert!("digesting".parse::<EpisodeStatus>().is_err());
    }

    #[test]
    fn max_score_picks_the_highest_topic() {
        let mut scores = HashMap::new();
        scores.insert("ai".to_string(), 0.4);
        scores.insert("soc".to_string(), 0.9);
        let episode = Episode {
            id: 1,
            feed_id: 1,
            episode_guid: "g".into(),
            title: "t".into(),
            published_date: Utc::now(),
            audio_url: "https://example.com/a.mp3".into(),
            duration_seconds: None,
            status: EpisodeStatus::Scored,
            transcript_text: None,
            scores: Some(scores),
            word_count: None,
            failure_count: 0,
            failure_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(episode.max_score(), Some(0.9));
    }
}
