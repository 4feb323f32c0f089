use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio download failed: {0}")]
    Download(#[source] reqwest::Error),

    #[error("I/O error handling audio file: {0}")]
    Io(#[source] std::io::Error),

    #[error("audio chunking tool failed: {0}")]
    ChunkingFailed(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for AudioError {
    fn kind(&self) -> ErrorKind {
        match self {
            AudioError::Download(e) if e.is_timeout() || e.is_connect() => ErrorKind::Transient,
            AudioError::Download(e) if e.status().map(|s| s.is_server_error()).unwrap_or(false) => {
                ErrorKind::Transient
            }
            AudioError::Download(_) => ErrorKind::InputInvalid,
            AudioError::Io(_) => ErrorKind::ResourceExhausted,
            AudioError::ChunkingFailed(_) => ErrorKind::InputInvalid,
            AudioError::TranscriptionFailed(_) => ErrorKind::InputInvalid,
            AudioError::Other(_) => ErrorKind::InputInvalid,
        }
    }
}
