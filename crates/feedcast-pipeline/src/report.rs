//! The orchestrator's structured report and the failed-item identity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use feedcast_common::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseName {
    Discovery,
    Audio,
    Digest,
    Tts,
    Publishing,
    Retention,
}

impl PhaseName {
    pub const ALL: [PhaseName; 6] = [
        PhaseName::Discovery,
        PhaseName::Audio,
        PhaseName::Digest,
        PhaseName::Tts,
        PhaseName::Publishing,
        PhaseName::Retention,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseName::Discovery => "discovery",
            PhaseName::Audio => "audio",
            PhaseName::Digest => "digest",
            PhaseName::Tts => "tts",
            PhaseName::Publishing => "publishing",
            PhaseName::Retention => "retention",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePhaseNameError;

impl std::str::FromStr for PhaseName {
    type Err = ParsePhaseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(PhaseName::Discovery),
            "audio" => Ok(PhaseName::Audio),
            "digest" => Ok(PhaseName::Digest),
            "tts" => Ok(PhaseName::Tts),
            "publishing" => Ok(PhaseName::Publishing),
            "retention" => Ok(PhaseName::Retention),
            _ => Err(ParsePhaseNameError),
        }
    }
}

/// A single failed item, identified by whatever natural key makes sense
/// for its phase (feed url, episode guid, topic name, digest id, ...).
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub identity: String,
    pub reason: String,
}

/// One phase's outcome. `counts` is a free-form
/// grouping (e.g. `"new_episodes" -> 3`) rather than a fixed struct,
/// because every phase groups its summary differently (per-feed for
/// Discovery, per-episode status for Audio, per-topic for Digest).
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: PhaseName,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub counts: BTreeMap<String, i64>,
    pub errors: Vec<ItemFailure>,
    /// Set when the phase itself could not run to completion (a
    /// phase-level abort, as opposed to per-item failures recorded in
    /// `errors`).
    pub aborted: bool,
    /// The classified kind of the error that aborted the phase, used by `feedcast-cli` to pick between exit
    /// codes 1 and 3. `None` unless `aborted`.
    pub aborted_kind: Option<ErrorKind>,
}

impl PhaseReport {
    pub fn new(phase: PhaseName, started_at: DateTime<Utc>) -> Self {
        PhaseReport {
            phase,
            started_at,
            ended_at: started_at,
            counts: BTreeMap::new(),
            errors: Vec::new(),
            aborted: false,
            aborted_kind: None,
        }
    }

    pub fn increment(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn record_failure(&mut self, identity: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(ItemFailure {
            identity: identity.into(),
            reason: reason.into(),
        });
    }

    pub fn aborted(
        phase: PhaseName,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        reason: impl Into<String>,
        kind: ErrorKind,
    ) -> Self {
        let mut report = PhaseReport::new(phase, started_at);
        report.ended_at = ended_at;
        report.aborted = true;
        report.aborted_kind = Some(kind);
        report.record_failure(phase.as_str(), reason);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn phase_name_round_trips_through_display_and_from_str() {
        for phase in PhaseName::ALL {
            let parsed = PhaseName::from_str(phase.as_str()).unwrap();
            assert_eq!(parsed, phase);
        }
    }

    #[test]
    fn unknown_phase_name_is_rejected() {
        assert!(PhaseName::from_str("scoring").is_err());
    }

    #[test]
    fn increment_accumulates_per_key() {
        let mut report = PhaseReport::new(PhaseName::Discovery, Utc::now());
        report.increment("new_episodes");
        report.increment("new_episodes");
        report.increment("feeds_checked");
        assert_eq!(report.counts["new_episodes"], 2);
        assert_eq!(report.counts["feeds_checked"], 1);
    }

    #[test]
    fn aborted_report_records_a_single_failure_against_the_phase() {
        let now = Utc::now();
        let report = PhaseReport::aborted(PhaseName::Audio, now, now, "disk full", ErrorKind::ResourceExhausted);
        assert!(report.aborted);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].identity, "audio");
    }
}
