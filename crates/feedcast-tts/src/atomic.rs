//! The atomic write protocol: render to a temp file, probe
//! it, then rename to its final staging name. The DB write that must
//! accompany the rename (in the same transaction) is the caller's
//! responsibility — `feedcast-store` owns transactions, this crate only
//! owns the filesystem half of the protocol.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::error::TtsError;
use crate::probe::{assert_plausible_duration, probe_duration_seconds};

/// Result of successfully staging synthesized audio to disk.
pub struct StagedAudio {
    pub final_path: PathBuf,
    pub duration_seconds: f64,
}

/// Writes `bytes` to a temp file under `staging_dir`, probes it, and on
/// success renames it to `{topic_slug}_{YYYYMMDD}_{HHMMSS}.mp3`.
///
/// On any failure the temp (and partial) file is removed and the error is
/// returned; the caller must leave the Digest row untouched in that case.
pub async fn stage_audio(
    staging_dir: &Path,
    topic_slug: &str,
    now: DateTime<Utc>,
    bytes: &[u8],
    is_no_content: bool,
) -> Result<StagedAudio, TtsError> {
    let temp_path = staging_dir.join(format!("{topic_slug}_{}.tmp", uuid_like_suffix(now)));

    if let Err(e) = fs::write(&temp_path, bytes).await {
        return Err(TtsError::Io(e));
    }

    let probe_result = probe_duration_seconds(bytes).and_then(|duration| {
        assert_plausible_duration(duration, is_no_content)?;
        Ok(duration)
    });

    let duration_seconds = match probe_result {
        Ok(duration) => duration,
        Err(e) => {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    let final_path = staging_dir.join(format!(
        "{topic_slug}_{}.mp3",
        now.format("%Y%m%d_%H%M%S")
    ));

    if let Err(e) = fs::rename(&temp_path, &final_path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(TtsError::Io(e));
    }

    Ok(StagedAudio {
        final_path,
        duration_seconds,
    })
}

fn uuid_like_suffix(now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp(), now.timestamp_subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn invalid_audio_bytes_leave_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let result = stage_audio(dir.path(), "ai", now, &[1, 2, 3], false).await;
        assert!(result.is_err());
        let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(remaining.is_empty());
    }
}
