//! A concrete `Transcriber` over a local `whisper.cpp`-style CLI binary:
//! spawns the process per chunk, waits on `.output()`, checks
//! `status.success()`, and surfaces stderr on failure. A thin, swappable
//! wrapper around an external speech-to-text model, not a reimplementation
//! of one.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::AudioError;
use crate::traits::Transcriber;

/// Invokes a whisper.cpp-compatible CLI (`whisper-cli -f <chunk> -otxt -of
/// <stem> -l <language> -m <model>`) and reads back the `.txt` sidecar it
/// writes next to the requested output stem.
pub struct WhisperCliTranscriber {
    binary: String,
    model_path: String,
    language: String,
}

impl WhisperCliTranscriber {
    pub fn new(model_path: impl Into<String>) -> Self {
        Self {
            binary: "whisper-cli".to_string(),
            model_path: model_path.into(),
            language: "en".to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, chunk_path: &Path) -> Result<String, AudioError> {
        let out_stem = chunk_path.with_extension("");

        let output = Command::new(&self.binary)
            .arg("-f")
            .arg(chunk_path)
            .args(["-m", &self.model_path])
            .args(["-l", &self.language])
            .args(["-otxt", "-of"])
            .arg(&out_stem)
            .args(["-nt"])
            .output()
            .await
            .map_err(AudioError::Io)?;

        if !output.status.success() {
            return Err(AudioError::TranscriptionFailed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let txt_path = out_stem.with_extension("txt");
        let text = tokio::fs::read_to_string(&txt_path).await.map_err(AudioError::Io)?;
        let _ = tokio::fs::remove_file(&txt_path).await;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_surfaces_as_io_error() {
        let transcriber = WhisperCliTranscriber::new("/nonexistent/model.bin")
            .with_binary("/nonexistent/whisper-cli-binary");
        let result = transcriber.transcribe(Path::new("/tmp/chunk_0000.mp3")).await;
        assert!(result.is_err());
    }
}
