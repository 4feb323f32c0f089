use feedcast_common::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("TTS request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("synthesized audio failed the probe: {0}")]
    ProbeFailed(String),

    #[error("script exceeds max_characters ({len} > {max})")]
    ScriptTooLong { len: usize, max: i64 },

    #[error("I/O error staging synthesized audio: {0}")]
    Io(#[source] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl feedcast_common::error::Classify for TtsError {
    fn kind(&self) -> ErrorKind {
        match self {
            TtsError::Request(e) if e.is_timeout() || e.is_connect() => ErrorKind::Transient,
            TtsError::Request(e) if e.status().map(|s| s.is_server_error()).unwrap_or(false) => {
                ErrorKind::Transient
            }
            TtsError::Request(_) => ErrorKind::InputInvalid,
            TtsError::ProbeFailed(_) => ErrorKind::InputInvalid,
            TtsError::ScriptTooLong { .. } => ErrorKind::InputInvalid,
            TtsError::Io(_) => ErrorKind::ResourceExhausted,
            TtsError::Other(_) => ErrorKind::InputInvalid,
        }
    }
}
