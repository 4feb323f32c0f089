//! Streams an episode's audio to a local temp path, grounded in the
//! `reqwest::Client` streaming idiom used for every HTTP boundary in this
//! workspace (`feedcast-feed::client`, `feedcast-artifacts::github`) —
//! the one difference is the response body is streamed to disk instead
//! of buffered, since episode audio can run tens of megabytes and the
//! memory-bounded invariant applies to the whole Audio phase, not only
//! the transcript buffer.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::AudioError;
use crate::traits::AudioDownloader;

pub struct HttpAudioDownloader {
    http: reqwest::Client,
}

impl HttpAudioDownloader {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to build audio download HTTP client");
        Self { http }
    }
}

impl Default for HttpAudioDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioDownloader for HttpAudioDownloader {
    async fn download(&self, audio_url: &str, dest: &Path) -> Result<(), AudioError> {
        let response = self
            .http
            .get(audio_url)
            .send()
            .await
            .map_err(AudioError::Download)?
            .error_for_status()
            .map_err(AudioError::Download)?;

        let mut file = File::create(dest).await.map_err(AudioError::Io)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AudioError::Download)?;
            file.write_all(&chunk).await.map_err(AudioError::Io)?;
        }
        file.flush().await.map_err(AudioError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn downloads_response_body_to_dest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("episode.mp3");

        let downloader = HttpAudioDownloader::new();
        downloader.download(&server.uri(), &dest).await.unwrap();

        let bytes = tokio::fs::read(&dest).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("episode.mp3");
        let downloader = HttpAudioDownloader::new();
        assert!(downloader.download(&server.uri(), &dest).await.is_err());
    }
}
