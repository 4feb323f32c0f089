//! External-boundary dependencies, injected as `Arc<dyn Trait>` so phases
//! are testable against mocks.

use std::sync::Arc;

use feedcast_ai::{ContentScorer, MetadataGenerator, ScriptGenerator};
use feedcast_artifacts::ArtifactHost;
use feedcast_audio::{AudioChunker, AudioDownloader, Transcriber};
use feedcast_feed::FeedFetcher;
use feedcast_tts::TtsClient;

pub struct PipelineDeps {
    pub feed_fetcher: Arc<dyn FeedFetcher>,
    pub audio_downloader: Arc<dyn AudioDownloader>,
    pub audio_chunker: Arc<dyn AudioChunker>,
    pub transcriber: Arc<dyn Transcriber>,
    pub content_scorer: Arc<dyn ContentScorer>,
    pub script_generator: Arc<dyn ScriptGenerator>,
    pub metadata_generator: Arc<dyn MetadataGenerator>,
    pub tts_client: Arc<dyn TtsClient>,
    pub artifact_host: Arc<dyn ArtifactHost>,
}
