use async_trait::async_trait;

use crate::error::TtsError;

/// Synthesizes a script into audio bytes. Injected as `Arc<dyn TtsClient>`
/// so the TTS phase is testable against a stub.
#[async_trait]
pub trait TtsClient: Send + Sync {
    async fn synthesize(&self, script: &str, voice_id: &str, model: &str) -> Result<Vec<u8>, TtsError>;
}
