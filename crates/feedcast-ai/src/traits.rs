//! Boundary traits for the three LLM-backed operations the Digest/TTS
//! phases need. Injected as `Arc<dyn Trait>` so phases are testable
//! against mocks.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AiError;

/// Scores a transcript against the set of active topic names. Every
/// returned value lies in `[0.0, 1.0]` and every key is one of the
/// requested topic names.
#[async_trait]
pub trait ContentScorer: Send + Sync {
    async fn score(
        &self,
        transcript: &str,
        topics: &[ScoringTopic],
        model: &str,
        max_tokens: i64,
    ) -> Result<HashMap<String, f64>, AiError>;
}

#[derive(Debug, Clone)]
pub struct ScoringTopic {
    pub name: String,
    pub instructions_md: String,
}

/// Produces the spoken script for a topic's digest from a set of trimmed
/// transcripts.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate_script(
        &self,
        topic_name: &str,
        instructions_md: &str,
        transcripts: &[String],
        model: &str,
        max_output_tokens: i64,
    ) -> Result<String, AiError>;
}

/// Best-effort title/summary generation for a digest. Callers are
/// responsible for the deterministic fallback
/// on error; this trait only reports failure, never fabricates a fallback
/// itself, so the fallback policy stays visible at the call site.
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn generate_metadata(
        &self,
        topic_name: &str,
        script_content: &str,
        model: &str,
        max_title_tokens: i64,
        max_summary_tokens: i64,
        max_description_tokens: i64,
    ) -> Result<DigestMetadata, AiError>;
}

#[derive(Debug, Clone)]
pub struct DigestMetadata {
    pub title: String,
    pub summary: String,
    pub description: String,
}
