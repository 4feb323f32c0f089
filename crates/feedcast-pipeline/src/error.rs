use feedcast_common::error::{Classify, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] feedcast_store::StoreError),

    #[error(transparent)]
    Feed(#[from] feedcast_feed::FeedError),

    #[error(transparent)]
    Audio(#[from] feedcast_audio::AudioError),

    #[error(transparent)]
    Ai(#[from] feedcast_ai::AiError),

    #[error(transparent)]
    Tts(#[from] feedcast_tts::TtsError),

    #[error(transparent)]
    Artifact(#[from] feedcast_artifacts::ArtifactError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Classify for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Store(e) => e.kind(),
            PipelineError::Feed(e) => e.kind(),
            PipelineError::Audio(e) => e.kind(),
            PipelineError::Ai(e) => e.kind(),
            PipelineError::Tts(e) => e.kind(),
            PipelineError::Artifact(e) => e.kind(),
            PipelineError::Other(_) => ErrorKind::IntegrityViolation,
        }
    }
}
