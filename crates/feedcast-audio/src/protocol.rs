//! The memory-efficient chunked transcription protocol.
//!
//! Chunks are transcribed strictly sequentially; each chunk's text is
//! hand off to the sink and dropped before the next chunk is read, so the
//! in-process buffer never holds more than one chunk regardless of
//! episode length.

use std::path::Path;

use tracing::debug;

use crate::error::AudioError;
use crate::traits::{Transcriber, TranscriptSink};

/// Transcribes `chunks` in order against `transcriber`, streaming each
/// chunk's text to `sink` one at a time, then finalizes with the total
/// word count. Returns the word count.
pub async fn transcribe_episode(
    transcriber: &dyn Transcriber,
    sink: &dyn TranscriptSink,
    episode_guid: &str,
    chunks: &[impl AsRef<Path>],
) -> Result<i64, AudioError> {
    let mut word_count: i64 = 0;

    for (index, chunk_path) in chunks.iter().enumerate() {
        let chunk_number = (index + 1) as i64;
        let text = transcriber.transcribe(chunk_path.as_ref()).await?;
        word_count += text.split_whitespace().count() as i64;

        debug!(episode_guid, chunk_number, chars = text.len(), "transcribed chunk");

        // `text` is appended and then dropped at the end of this
        // iteration — nothing carries it into the next loop pass.
        sink.append_chunk(episode_guid, chunk_number, &text).await?;
    }

    sink.finalize(episode_guid, word_count).await?;
    Ok(word_count)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct StubTranscriber {
        texts: Vec<String>,
    }

    #[async_trait]
    impl Transcriber for StubTranscriber {
        async fn transcribe(&self, chunk_path: &Path) -> Result<String, AudioError> {
            let index: usize = chunk_path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap();
            Ok(self.texts[index].clone())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        appended: Mutex<Vec<(i64, String)>>,
        finalized: Mutex<Option<i64>>,
    }

    #[async_trait]
    impl TranscriptSink for RecordingSink {
        async fn append_chunk(&self, _episode_guid: &str, chunk_number: i64, text: &str) -> Result<(), AudioError> {
            self.appended.lock().unwrap().push((chunk_number, text.to_string()));
            Ok(())
        }

        async fn finalize(&self, _episode_guid: &str, word_count: i64) -> Result<(), AudioError> {
            *self.finalized.lock().unwrap() = Some(word_count);
            Ok(())
        }
    }

    #[tokio::test]
    async fn appends_each_chunk_in_order_and_finalizes_with_total_word_count() {
        let transcriber = StubTranscriber {
            texts: vec!["hello world".to_string(), "three word chunk".to_string()],
        };
        let sink = RecordingSink::default();
        let chunks: Vec<PathBuf> = vec![PathBuf::from("0.mp3"), PathBuf::from("1.mp3")];

        let word_count = transcribe_episode(&transcriber, &sink, "guid-1", &chunks)
            .await
            .unwrap();

        assert_eq!(word_count, 5);
        let appended = sink.appended.lock().unwrap();
        assert_eq!(appended[0], (1, "hello world".to_string()));
        assert_eq!(appended[1], (2, "three word chunk".to_string()));
        assert_eq!(*sink.finalized.lock().unwrap(), Some(5));
    }

    #[tokio::test]
    async fn empty_chunk_list_finalizes_with_zero_words() {
        let transcriber = StubTranscriber { texts: vec![] };
        let sink = RecordingSink::default();
        let chunks: Vec<PathBuf> = vec![];

        let word_count = transcribe_episode(&transcriber, &sink, "guid-1", &chunks)
            .await
            .unwrap();

        assert_eq!(word_count, 0);
        assert_eq!(*sink.finalized.lock().unwrap(), Some(0));
    }
}
