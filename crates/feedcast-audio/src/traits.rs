use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AudioError;

/// Downloads an episode's source audio to a local path.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    async fn download(&self, audio_url: &str, dest: &Path) -> Result<(), AudioError>;
}

/// The audio chunking tool boundary: an external collaborator specified
/// only at its interface. Splits a downloaded source file into
/// fixed-duration segments on disk, in playback order.
#[async_trait]
pub trait AudioChunker: Send + Sync {
    async fn chunk(
        &self,
        source_path: &Path,
        out_dir: &Path,
        chunk_duration_minutes: i64,
        max_chunks: i64,
    ) -> Result<Vec<PathBuf>, AudioError>;
}

/// The local speech-to-text model boundary.
/// Transcribes one audio chunk at a time; the memory-bounded chunked
/// protocol (see `protocol.rs`) is what guarantees only one chunk's text
/// is ever held in process memory, not this trait itself.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, chunk_path: &Path) -> Result<String, AudioError>;
}

/// Where the chunked transcription protocol writes each
/// chunk's text and its terminal word count. Implemented by an adapter
/// over `feedcast-store::episodes` in the pipeline crate — this crate
/// stays free of a `feedcast-store` dependency so the protocol can be
/// unit-tested against an in-memory sink.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Single DB round trip per chunk: append the
    /// chunk's text, then release it from process memory.
    async fn append_chunk(&self, episode_guid: &str, chunk_number: i64, text: &str) -> Result<(), AudioError>;

    /// `processing -> transcribed` with the final word count.
    async fn finalize(&self, episode_guid: &str, word_count: i64) -> Result<(), AudioError>;
}
