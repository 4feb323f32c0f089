//! A concrete `AudioChunker` over the `ffmpeg` CLI: spawns the process,
//! waits on `.output()`, checks `status.success()`, and surfaces stderr
//! on failure. A thin, swappable wrapper around an external tool, not a
//! reimplementation of an audio codec.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::AudioError;
use crate::traits::AudioChunker;

pub struct FfmpegChunker {
    ffmpeg_bin: String,
}

impl FfmpegChunker {
    pub fn new() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }

    pub fn with_binary(ffmpeg_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
        }
    }
}

impl Default for FfmpegChunker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioChunker for FfmpegChunker {
    async fn chunk(
        &self,
        source_path: &Path,
        out_dir: &Path,
        chunk_duration_minutes: i64,
        max_chunks: i64,
    ) -> Result<Vec<PathBuf>, AudioError> {
        tokio::fs::create_dir_all(out_dir).await.map_err(AudioError::Io)?;

        let segment_time = (chunk_duration_minutes * 60).max(1).to_string();
        let pattern = out_dir.join("chunk_%04d.mp3");

        let output = Command::new(&self.ffmpeg_bin)
            .args([
                "-y",
                "-i",
            ])
            .arg(source_path)
            .args(["-f", "segment", "-segment_time", &segment_time, "-c", "copy"])
            .arg(&pattern)
            .output()
            .await
            .map_err(AudioError::Io)?;

        if !output.status.success() {
            return Err(AudioError::ChunkingFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let mut entries = tokio::fs::read_dir(out_dir).await.map_err(AudioError::Io)?;
        let mut chunks = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(AudioError::Io)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("mp3") {
                chunks.push(path);
            }
        }
        chunks.sort();

        if max_chunks > 0 && (chunks.len() as i64) > max_chunks {
            chunks.truncate(max_chunks as usize);
        }

        if chunks.is_empty() {
            return Err(AudioError::ChunkingFailed(
                "ffmpeg produced no chunk files".to_string(),
            ));
        }

        Ok(chunks)
    }
}
